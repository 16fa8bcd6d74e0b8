//! Static country dialing-code tables.

use std::collections::HashMap;
use std::sync::LazyLock;

/// ISO 3166-1 alpha-2 code (plus the `UK` alias) to international dialing code.
const DIALING_CODES: &[(&str, &str)] = &[
    ("AU", "61"),
    ("NZ", "64"),
    ("US", "1"),
    ("CA", "1"),
    ("GB", "44"),
    ("UK", "44"),
    ("IE", "353"),
    ("SG", "65"),
    ("HK", "852"),
    ("MY", "60"),
    ("PH", "63"),
    ("ID", "62"),
    ("TH", "66"),
    ("VN", "84"),
    ("IN", "91"),
    ("PK", "92"),
    ("BD", "880"),
    ("LK", "94"),
    ("NP", "977"),
    ("JP", "81"),
    ("KR", "82"),
    ("CN", "86"),
    ("TW", "886"),
    ("DE", "49"),
    ("FR", "33"),
    ("IT", "39"),
    ("ES", "34"),
    ("PT", "351"),
    ("NL", "31"),
    ("BE", "32"),
    ("AT", "43"),
    ("CH", "41"),
    ("SE", "46"),
    ("NO", "47"),
    ("DK", "45"),
    ("FI", "358"),
    ("PL", "48"),
    ("CZ", "420"),
    ("GR", "30"),
    ("RU", "7"),
    ("UA", "380"),
    ("ZA", "27"),
    ("EG", "20"),
    ("NG", "234"),
    ("KE", "254"),
    ("AE", "971"),
    ("SA", "966"),
    ("QA", "974"),
    ("KW", "965"),
    ("BH", "973"),
    ("OM", "968"),
    ("IL", "972"),
    ("TR", "90"),
    ("MX", "52"),
    ("BR", "55"),
    ("AR", "54"),
    ("CL", "56"),
    ("CO", "57"),
    ("PE", "51"),
    ("VE", "58"),
    ("FJ", "679"),
    ("PG", "675"),
    ("NC", "687"),
    ("WS", "685"),
    ("TO", "676"),
    ("VU", "678"),
];

/// Upper-cased country name or alias to ISO 3166-1 alpha-2 code.
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("AUSTRALIA", "AU"),
    ("NEW ZEALAND", "NZ"),
    ("UNITED STATES", "US"),
    ("USA", "US"),
    ("CANADA", "CA"),
    ("UNITED KINGDOM", "GB"),
    ("UK", "GB"),
    ("GREAT BRITAIN", "GB"),
    ("IRELAND", "IE"),
    ("SINGAPORE", "SG"),
    ("HONG KONG", "HK"),
    ("MALAYSIA", "MY"),
    ("PHILIPPINES", "PH"),
    ("INDONESIA", "ID"),
    ("THAILAND", "TH"),
    ("VIETNAM", "VN"),
    ("INDIA", "IN"),
    ("PAKISTAN", "PK"),
    ("BANGLADESH", "BD"),
    ("SRI LANKA", "LK"),
    ("NEPAL", "NP"),
    ("JAPAN", "JP"),
    ("SOUTH KOREA", "KR"),
    ("KOREA", "KR"),
    ("CHINA", "CN"),
    ("TAIWAN", "TW"),
    ("GERMANY", "DE"),
    ("FRANCE", "FR"),
    ("ITALY", "IT"),
    ("SPAIN", "ES"),
    ("PORTUGAL", "PT"),
    ("NETHERLANDS", "NL"),
    ("BELGIUM", "BE"),
    ("AUSTRIA", "AT"),
    ("SWITZERLAND", "CH"),
    ("SWEDEN", "SE"),
    ("NORWAY", "NO"),
    ("DENMARK", "DK"),
    ("FINLAND", "FI"),
    ("POLAND", "PL"),
    ("CZECH REPUBLIC", "CZ"),
    ("GREECE", "GR"),
    ("RUSSIA", "RU"),
    ("UKRAINE", "UA"),
    ("SOUTH AFRICA", "ZA"),
    ("EGYPT", "EG"),
    ("NIGERIA", "NG"),
    ("KENYA", "KE"),
    ("UNITED ARAB EMIRATES", "AE"),
    ("UAE", "AE"),
    ("SAUDI ARABIA", "SA"),
    ("QATAR", "QA"),
    ("KUWAIT", "KW"),
    ("BAHRAIN", "BH"),
    ("OMAN", "OM"),
    ("ISRAEL", "IL"),
    ("TURKEY", "TR"),
    ("MEXICO", "MX"),
    ("BRAZIL", "BR"),
    ("ARGENTINA", "AR"),
    ("CHILE", "CL"),
    ("COLOMBIA", "CO"),
    ("PERU", "PE"),
    ("VENEZUELA", "VE"),
    ("FIJI", "FJ"),
    ("PAPUA NEW GUINEA", "PG"),
    ("NEW CALEDONIA", "NC"),
    ("SAMOA", "WS"),
    ("TONGA", "TO"),
    ("VANUATU", "VU"),
];

static BY_ISO: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| DIALING_CODES.iter().copied().collect());

static BY_NAME: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| COUNTRY_NAMES.iter().copied().collect());

fn normalize(country: &str) -> String {
    country.trim().to_ascii_uppercase()
}

/// Resolve an ISO alpha-2 code or a country name to its dialing code.
///
/// The ISO table is consulted first, then the name table.
pub fn dialing_code(country: &str) -> Option<&'static str> {
    let normalized = normalize(country);
    if let Some(code) = BY_ISO.get(normalized.as_str()) {
        return Some(*code);
    }
    BY_NAME
        .get(normalized.as_str())
        .and_then(|iso| BY_ISO.get(iso).copied())
}

/// Whether [`dialing_code`] resolves `country`.
pub fn is_supported(country: &str) -> bool {
    dialing_code(country).is_some()
}

/// Map an ISO code or country name to its ISO alpha-2 code.
pub fn normalize_to_iso(country: &str) -> Option<&'static str> {
    let normalized = normalize(country);
    if let Some((iso, _)) = BY_ISO.get_key_value(normalized.as_str()) {
        return Some(*iso);
    }
    BY_NAME.get(normalized.as_str()).copied()
}

/// Whether a digit string starts with any dialing code in the table.
pub fn starts_with_known_dialing_code(digits: &str) -> bool {
    DIALING_CODES
        .iter()
        .any(|(_, code)| digits.starts_with(code))
}
