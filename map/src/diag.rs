// map/src/diag.rs
//
// Console diagnostics. wasm32 goes to the browser console, everything else to stdout/stderr.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

pub fn emit(level: Level, msg: &str) {
    #[cfg(target_arch = "wasm32")]
    match level {
        Level::Info => web_sys::console::log_1(&msg.into()),
        Level::Warn => web_sys::console::warn_1(&msg.into()),
        Level::Error => web_sys::console::error_1(&msg.into()),
    };

    #[cfg(not(target_arch = "wasm32"))]
    match level {
        Level::Info => println!("{msg}"),
        Level::Warn | Level::Error => eprintln!("{msg}"),
    };
}

#[macro_export]
macro_rules! log {
    ($($t:tt)*) => {{
        let s = format!($($t)*);
        $crate::diag::emit($crate::diag::Level::Info, &s);
    }}
}

#[macro_export]
macro_rules! log_warn {
    ($($t:tt)*) => {{
        let s = format!($($t)*);
        $crate::diag::emit($crate::diag::Level::Warn, &s);
    }}
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => {{
        let s = format!($($t)*);
        $crate::diag::emit($crate::diag::Level::Error, &s);
    }}
}
