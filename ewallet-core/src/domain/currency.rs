//! Country dialing code to currency mapping
//!
//! Matches the table the backend uses when it opens wallets and bank
//! accounts, so balances can be labelled without an extra round trip.

const UNKNOWN_CURRENCY: &str = "UNKNOWN";

const DIAL_CODE_CURRENCIES: &[(&str, &str)] = &[
    ("+1", "USD"),
    ("+7", "RUB"),
    ("+20", "EGP"),
    ("+27", "ZAR"),
    ("+30", "EUR"),
    ("+31", "EUR"),
    ("+33", "EUR"),
    ("+34", "EUR"),
    ("+36", "HUF"),
    ("+39", "EUR"),
    ("+40", "RON"),
    ("+41", "CHF"),
    ("+43", "EUR"),
    ("+44", "GBP"),
    ("+45", "DKK"),
    ("+46", "SEK"),
    ("+47", "NOK"),
    ("+48", "PLN"),
    ("+49", "EUR"),
    ("+55", "BRL"),
    ("+60", "MYR"),
    ("+61", "AUD"),
    ("+62", "IDR"),
    ("+63", "PHP"),
    ("+64", "NZD"),
    ("+65", "SGD"),
    ("+66", "THB"),
    ("+81", "JPY"),
    ("+82", "KRW"),
    ("+84", "VND"),
    ("+86", "CNY"),
    ("+90", "TRY"),
    ("+91", "INR"),
    ("+92", "PKR"),
    ("+94", "LKR"),
    ("+95", "MMK"),
    ("+98", "IRR"),
    ("+212", "MAD"),
    ("+213", "DZD"),
    ("+216", "TND"),
    ("+218", "LYD"),
    ("+234", "NGN"),
    ("+254", "KES"),
    ("+255", "TZS"),
    ("+256", "UGX"),
    ("+351", "EUR"),
    ("+353", "EUR"),
    ("+354", "ISK"),
    ("+357", "EUR"),
    ("+358", "EUR"),
    ("+359", "BGN"),
    ("+373", "MDL"),
    ("+375", "BYN"),
    ("+380", "UAH"),
    ("+381", "RSD"),
    ("+385", "HRK"),
    ("+386", "EUR"),
    ("+387", "BAM"),
    ("+389", "MKD"),
    ("+420", "CZK"),
    ("+421", "EUR"),
    ("+855", "KHR"),
    ("+856", "LAK"),
    ("+880", "BDT"),
    ("+886", "TWD"),
    ("+960", "MVR"),
    ("+961", "LBP"),
    ("+962", "JOD"),
    ("+963", "SYP"),
    ("+964", "IQD"),
    ("+965", "KWD"),
    ("+966", "SAR"),
    ("+968", "OMR"),
    ("+971", "AED"),
    ("+972", "ILS"),
    ("+973", "BHD"),
    ("+974", "QAR"),
    ("+977", "NPR"),
    ("+992", "TJS"),
    ("+993", "TMT"),
    ("+994", "AZN"),
    ("+995", "GEL"),
    ("+996", "KGS"),
    ("+998", "UZS"),
];

/// Currency for a dialing code or a full `<code>-<digits>` phone number
///
/// Longest matching prefix wins, so `+880` is not mistaken for `+8x`.
pub fn currency_for_phone(phone: &str) -> &'static str {
    let code = phone.split('-').next().unwrap_or(phone).trim();

    DIAL_CODE_CURRENCIES
        .iter()
        .filter(|(prefix, _)| code.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, currency)| *currency)
        .unwrap_or(UNKNOWN_CURRENCY)
}

/// Dialing code part of a `<code>-<digits>` phone number
pub fn dial_code(phone: &str) -> Option<&str> {
    phone
        .split_once('-')
        .map(|(code, _)| code)
        .filter(|code| code.starts_with('+'))
}
