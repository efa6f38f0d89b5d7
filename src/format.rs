//! Text formatting helpers for list captions

use once_cell::sync::Lazy;

/// Thousands-separated rendering of a count ("12345" -> "12,345").
pub fn number_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

struct PhonePattern {
    prefix: &'static str,
    /// Digit grouping after the country code; 'X' is a digit slot.
    groups: &'static str,
}

// Longest prefix first so "998" wins over "9"-level fallthrough.
static PHONE_PATTERNS: Lazy<Vec<PhonePattern>> = Lazy::new(|| {
    let mut patterns = vec![
        PhonePattern { prefix: "1", groups: "XXX XXX XXXX" },
        PhonePattern { prefix: "7", groups: "XXX XXX XX XX" },
        PhonePattern { prefix: "33", groups: "X XX XX XX XX" },
        PhonePattern { prefix: "34", groups: "XXX XXX XXX" },
        PhonePattern { prefix: "39", groups: "XXX XXX XXXX" },
        PhonePattern { prefix: "44", groups: "XXXX XXXXXX" },
        PhonePattern { prefix: "49", groups: "XXXX XXXXXXX" },
        PhonePattern { prefix: "55", groups: "XX XXXXX XXXX" },
        PhonePattern { prefix: "86", groups: "XXX XXXX XXXX" },
        PhonePattern { prefix: "91", groups: "XXXXX XXXXX" },
        PhonePattern { prefix: "380", groups: "XX XXX XX XX" },
        PhonePattern { prefix: "998", groups: "XX XXX XX XX" },
    ];
    patterns.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    patterns
});

/// Group a raw phone number (digits, optionally with punctuation) by the
/// country-code pattern it matches. Numbers with no known prefix come back as
/// a bare digit string. The caller prepends "+" when rendering.
pub fn format_phone_number(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let Some(pattern) = PHONE_PATTERNS
        .iter()
        .find(|p| digits.starts_with(p.prefix))
    else {
        return digits;
    };

    let mut out = String::from(pattern.prefix);
    out.push(' ');
    let mut rest = digits[pattern.prefix.len()..].chars();
    for slot in pattern.groups.chars() {
        match slot {
            'X' => match rest.next() {
                Some(d) => out.push(d),
                None => break,
            },
            sep => out.push(sep),
        }
    }
    // Digits past the pattern (extensions, oddly long numbers) are appended raw.
    let leftover: String = rest.collect();
    if !leftover.is_empty() {
        out.push(' ');
        out.push_str(&leftover);
    }
    out.trim_end().to_string()
}
