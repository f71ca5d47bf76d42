// map/src/legend.rs

use estate_shared::escape;
use estate_shared::CategoryColors;

/// Legend swatches, one per category, in payload order.
pub fn legend_html(colors: &CategoryColors) -> String {
    colors
        .iter()
        .map(|(category, color)| {
            format!(
                "<div class=\"legend-item\"><div class=\"legend-color\" style=\"background:{}\"></div><span>{}</span></div>",
                escape(color),
                escape(category)
            )
        })
        .collect()
}
