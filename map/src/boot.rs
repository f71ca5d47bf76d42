// map/src/boot.rs
//
// The page may evaluate the bundle more than once (debug reloads, a bundle
// listed twice). Each evaluation gets fresh wasm memory, so the browser keeps
// the flag on `window`; only that outlives a single evaluation. Everything that
// inserts DOM or binds listeners runs behind this flag. There is no reset.

use std::sync::atomic::{AtomicBool, Ordering};

/// Where the "already booted" bit is stored.
pub trait BootFlag {
    fn is_set(&self) -> bool;

    fn set(&self);

    /// Check-and-set. Returns `true` for the single caller that set it.
    fn try_set(&self) -> bool {
        if self.is_set() {
            return false;
        }
        self.set();
        true
    }
}

impl BootFlag for AtomicBool {
    fn is_set(&self) -> bool {
        self.load(Ordering::SeqCst)
    }

    fn set(&self) {
        self.store(true, Ordering::SeqCst);
    }

    fn try_set(&self) -> bool {
        self.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl<F: BootFlag + ?Sized> BootFlag for &F {
    fn is_set(&self) -> bool {
        (**self).is_set()
    }

    fn set(&self) {
        (**self).set()
    }

    fn try_set(&self) -> bool {
        (**self).try_set()
    }
}

pub struct BootGuard<F: BootFlag = AtomicBool> {
    flag: F,
}

impl BootGuard<AtomicBool> {
    /// A guard whose flag lives in this process only.
    pub const fn local() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }
}

impl Default for BootGuard<AtomicBool> {
    fn default() -> Self {
        Self::local()
    }
}

impl<F: BootFlag> BootGuard<F> {
    pub fn new(flag: F) -> Self {
        Self { flag }
    }

    pub fn has_booted(&self) -> bool {
        self.flag.is_set()
    }

    pub fn mark_booted(&self) {
        self.flag.set();
    }

    pub fn try_boot(&self) -> bool {
        self.flag.try_set()
    }

    /// Runs `init` only on the first call; later calls log and return `None`.
    pub fn run_once<T>(&self, init: impl FnOnce() -> T) -> Option<T> {
        if !self.try_boot() {
            log_warn!("[Boot] Duplicate script execution detected, aborting.");
            return None;
        }
        Some(init())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDom;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Stands in for a property on `window`: shared by every evaluation.
    #[derive(Clone, Default)]
    struct PageFlag(Rc<Cell<bool>>);

    impl BootFlag for PageFlag {
        fn is_set(&self) -> bool {
            self.0.get()
        }
        fn set(&self) {
            self.0.set(true);
        }
    }

    /// One evaluation of the page script: fresh module state, same page.
    struct Evaluation {
        guard: BootGuard<PageFlag>,
        dom: Rc<FakeDom>,
        map_inits: Rc<Cell<u32>>,
    }

    impl Evaluation {
        fn start(&self) {
            self.guard.run_once(|| {
                self.dom.children.borrow_mut().push("ai-news-ticker-box".into());
                self.map_inits.set(self.map_inits.get() + 1);
            });
        }
    }

    #[test]
    fn second_boot_is_a_no_op() {
        let guard = BootGuard::local();
        let inserted = Cell::new(0);

        assert!(guard.run_once(|| inserted.set(inserted.get() + 1)).is_some());
        assert!(guard.run_once(|| inserted.set(inserted.get() + 1)).is_none());

        assert_eq!(inserted.get(), 1);
        assert!(guard.has_booted());
    }

    #[test]
    fn mark_then_check() {
        let guard = BootGuard::local();
        assert!(!guard.has_booted());
        guard.mark_booted();
        assert!(guard.has_booted());
        assert!(!guard.try_boot());
    }

    #[test]
    fn racing_threads_boot_once() {
        static GUARD: BootGuard = BootGuard::local();
        let winners: usize = (0..8)
            .map(|_| std::thread::spawn(|| GUARD.try_boot()))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }

    #[test]
    fn re_evaluated_script_inserts_nothing() {
        let window = PageFlag::default();
        let dom = Rc::new(FakeDom::default());
        let map_inits = Rc::new(Cell::new(0));

        let evaluate = || Evaluation {
            guard: BootGuard::new(window.clone()),
            dom: dom.clone(),
            map_inits: map_inits.clone(),
        };

        evaluate().start();
        evaluate().start();

        assert_eq!(*dom.children.borrow(), vec!["ai-news-ticker-box".to_string()]);
        assert_eq!(map_inits.get(), 1);
    }

    #[test]
    fn per_evaluation_flag_does_not_survive_reload() {
        let dom = Rc::new(FakeDom::default());
        for _ in 0..2 {
            // Module state is rebuilt on every evaluation.
            let guard = BootGuard::local();
            guard.run_once(|| dom.children.borrow_mut().push("ai-news-ticker-box".into()));
        }
        assert_eq!(dom.children.borrow().len(), 2);
    }
}
