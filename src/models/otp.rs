use crate::utils::OTP_LENGTH;

/// Result of typing into one OTP slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpEdit {
    Rejected,
    /// Slot updated; `focus` is the slot the cursor moves to, if any.
    Accepted { focus: Option<usize> },
}

/// Four-slot numeric code typed on the verification screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OtpCode {
    digits: [Option<char>; OTP_LENGTH],
}

impl OtpCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole code submitted at once. Anything but exactly four digits is refused.
    pub fn from_code(code: &str) -> Option<Self> {
        if code.chars().count() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let mut otp = Self::new();
        otp.paste(code);
        Some(otp)
    }

    /// Accepts an empty string (clears the slot) or a single ASCII digit.
    pub fn set_digit(&mut self, index: usize, input: &str) -> OtpEdit {
        if index >= OTP_LENGTH {
            return OtpEdit::Rejected;
        }
        let mut chars = input.chars();
        let digit = match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(c), None) if c.is_ascii_digit() => Some(c),
            _ => return OtpEdit::Rejected,
        };

        self.digits[index] = digit;
        let focus = match digit {
            Some(_) if index + 1 < OTP_LENGTH => Some(index + 1),
            _ => None,
        };
        OtpEdit::Accepted { focus }
    }

    /// Backspace on an empty slot moves focus to the previous one.
    pub fn backspace(&self, index: usize) -> Option<usize> {
        match self.digits.get(index) {
            Some(None) if index > 0 => Some(index - 1),
            _ => None,
        }
    }

    /// Fills slots from pasted text. Only the first four characters are
    /// considered and they must all be digits; returns the slot to focus.
    pub fn paste(&mut self, text: &str) -> Option<usize> {
        let pasted: Vec<char> = text.chars().take(OTP_LENGTH).collect();
        if pasted.is_empty() || !pasted.iter().all(char::is_ascii_digit) {
            return None;
        }
        for (slot, digit) in self.digits.iter_mut().zip(&pasted) {
            *slot = Some(*digit);
        }
        Some(pasted.len().min(OTP_LENGTH - 1))
    }

    pub fn code(&self) -> String {
        self.digits.iter().flatten().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.digits.iter().all(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.digits = [None; OTP_LENGTH];
    }
}

/// `"john@x.io"` -> `"jo***@x.io"`. Addresses with a local part shorter than two
/// characters, or without `@`, are returned unchanged.
pub fn mask_email(email: &str) -> String {
    let Some(at) = email.rfind('@') else {
        return email.to_string();
    };
    let local = &email[..at];
    let mut chars = local.char_indices();
    match (chars.next(), chars.next()) {
        (Some(_), Some((second, c))) => {
            let prefix_end = second + c.len_utf8();
            format!("{}***{}", &local[..prefix_end], &email[at..])
        }
        _ => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_advances_focus_until_the_last_slot() {
        let mut otp = OtpCode::new();
        assert_eq!(otp.set_digit(0, "1"), OtpEdit::Accepted { focus: Some(1) });
        assert_eq!(otp.set_digit(1, "2"), OtpEdit::Accepted { focus: Some(2) });
        assert_eq!(otp.set_digit(2, "3"), OtpEdit::Accepted { focus: Some(3) });
        assert!(!otp.is_complete());
        assert_eq!(otp.set_digit(3, "4"), OtpEdit::Accepted { focus: None });
        assert!(otp.is_complete());
        assert_eq!(otp.code(), "1234");
    }

    #[test]
    fn non_digits_and_multiple_chars_are_rejected() {
        let mut otp = OtpCode::new();
        assert_eq!(otp.set_digit(0, "a"), OtpEdit::Rejected);
        assert_eq!(otp.set_digit(0, "12"), OtpEdit::Rejected);
        assert_eq!(otp.set_digit(4, "1"), OtpEdit::Rejected);
        assert_eq!(otp.code(), "");
    }

    #[test]
    fn clearing_a_slot_keeps_focus() {
        let mut otp = OtpCode::new();
        otp.set_digit(1, "5");
        assert_eq!(otp.set_digit(1, ""), OtpEdit::Accepted { focus: None });
        assert_eq!(otp.backspace(1), Some(0));
        assert_eq!(otp.backspace(0), None);

        otp.set_digit(2, "7");
        assert_eq!(otp.backspace(2), None);
    }

    #[test]
    fn paste_fills_from_the_first_slot() {
        let mut otp = OtpCode::new();
        assert_eq!(otp.paste("98"), Some(2));
        assert_eq!(otp.code(), "98");

        assert_eq!(otp.paste("123456"), Some(3));
        assert_eq!(otp.code(), "1234");
        assert!(otp.is_complete());
    }

    #[test]
    fn paste_with_non_digits_is_ignored() {
        let mut otp = OtpCode::new();
        otp.set_digit(0, "1");
        assert_eq!(otp.paste("12a4"), None);
        assert_eq!(otp.paste(""), None);
        assert_eq!(otp.code(), "1");

        otp.clear();
        assert_eq!(otp, OtpCode::new());
    }

    #[test]
    fn submitted_code_must_be_exactly_four_digits() {
        let otp = OtpCode::from_code("1234").unwrap();
        assert!(otp.is_complete());
        assert_eq!(otp.code(), "1234");

        assert_eq!(OtpCode::from_code("123456"), None);
        assert_eq!(OtpCode::from_code("123"), None);
        assert_eq!(OtpCode::from_code("12a4"), None);
        assert_eq!(OtpCode::from_code("１２３４"), None);
    }

    #[test]
    fn email_masking() {
        assert_eq!(mask_email("john@x.io"), "jo***@x.io");
        assert_eq!(mask_email("ab@x.io"), "ab***@x.io");
        assert_eq!(mask_email("a@x.io"), "a@x.io");
        assert_eq!(mask_email("no-at-sign"), "no-at-sign");
        assert_eq!(mask_email("a.b@c@d.io"), "a.***@d.io");
    }
}
