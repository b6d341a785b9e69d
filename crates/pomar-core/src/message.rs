//! Quote message variables.
//!
//! The engine does not send messages; it only fills the caller-owned
//! template with the numbers it computed. Three placeholders are
//! substituted: `{produto}`, `{preco}` and `{parcelas}`.

use crate::money::Money;
use crate::pricing::InstallmentQuote;

/// Template used when the shop never customized one.
pub const DEFAULT_WHATSAPP_TEMPLATE: &str = "*{produto}*\n\n\
À vista: {preco}\n\n\
Parcelado no cartão:\n{parcelas}";

/// Renders the installment table as message lines: `12x de R$ 492,60`.
pub fn installment_lines(installments: &[InstallmentQuote]) -> String {
    installments
        .iter()
        .map(|row| format!("{}x de {}", row.installments, row.value()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitutes the quote variables into `template`. Unknown placeholders
/// are left as-is; absent placeholders simply don't get their value.
pub fn render_quote_message(
    template: &str,
    product: &str,
    price: Money,
    installments: &[InstallmentQuote],
) -> String {
    template
        .replace("{produto}", product)
        .replace("{preco}", &price.to_string())
        .replace("{parcelas}", &installment_lines(installments))
}
