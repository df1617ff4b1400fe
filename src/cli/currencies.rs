use super::ui;
use crate::core::CurrencySet;
use crate::core::currency::flag_url;
use comfy_table::Cell;

/// Renders every selectable currency, sorted by code.
pub fn display_as_table(currencies: &CurrencySet, flags_base_url: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell("Country"),
        ui::header_cell("Flag"),
    ]);

    for (code, info) in currencies.iter() {
        table.add_row(vec![
            Cell::new(code),
            ui::optional_cell(info.name.as_deref()),
            Cell::new(&info.country),
            Cell::new(flag_url(flags_base_url, &info.country)),
        ]);
    }

    format!(
        "{}\n\n{}\n",
        ui::style_text("Currencies", ui::StyleType::Title),
        table
    )
}

pub fn run(currencies: &CurrencySet, flags_base_url: &str) {
    println!("{}", display_as_table(currencies, flags_base_url));
}
