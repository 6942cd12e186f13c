//! Digit extraction from opaque elements.

/// A type that maps elements to fixed-radix digit sequences.
///
/// The trie engine is element-type-agnostic; everything it knows about an
/// element comes through this trait. Digit `0` is reserved for the
/// end-of-sequence terminator when the digitizer is prefix-free.
pub trait Digitizer {
    /// The element type this digitizer understands.
    type Element;

    /// The number of distinct digit values, including the terminator when
    /// the digitizer is prefix-free. Every trie node has this many child
    /// slots.
    fn base(&self) -> usize;

    /// Whether no element's digit sequence can be a prefix of another's.
    fn is_prefix_free(&self) -> bool;

    /// The number of digits in the given element, terminator included for
    /// prefix-free digitizers.
    fn digit_count(&self, element: &Self::Element) -> usize;

    /// The digit of the element at the given place. Places at or past the
    /// element's natural end map to the terminator digit `0`.
    fn digit_at(&self, element: &Self::Element, place: usize) -> usize;

    /// A display form of the digit at the given place, for debugging and
    /// error messages.
    fn format_digit(&self, element: &Self::Element, place: usize) -> String;
}

/// A prefix-free digitizer over ASCII strings.
///
/// Characters are lower-cased and mapped to digits `1..=alphabet_size`;
/// digit `0` is the end-of-string terminator, so a string and any extension
/// of it always diverge at the terminator slot.
#[derive(Debug, Clone)]
pub struct StringDigitizer {
    base: usize,
}

impl StringDigitizer {
    /// Creates a digitizer for the given alphabet size. The base is one
    /// larger to make room for the terminator.
    #[must_use]
    pub const fn new(alphabet_size: usize) -> Self {
        Self {
            base: alphabet_size + 1,
        }
    }
}

impl Digitizer for StringDigitizer {
    type Element = String;

    fn base(&self) -> usize {
        self.base
    }

    fn is_prefix_free(&self) -> bool {
        true
    }

    fn digit_count(&self, element: &String) -> usize {
        element.len() + 1
    }

    fn digit_at(&self, element: &String, place: usize) -> usize {
        element
            .as_bytes()
            .get(place)
            .map_or(0, |byte| usize::from(byte.to_ascii_lowercase() - b'a') + 1)
    }

    fn format_digit(&self, element: &String, place: usize) -> String {
        element.as_bytes().get(place).map_or_else(
            || "#".to_owned(),
            |byte| char::from(byte.to_ascii_lowercase()).to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Digitizer, StringDigitizer};

    #[test]
    fn test_string_digitizer_base() {
        let digitizer = StringDigitizer::new(26);
        assert_eq!(digitizer.base(), 27);
        assert!(digitizer.is_prefix_free());
    }

    #[test]
    fn test_string_digitizer_digits() {
        let digitizer = StringDigitizer::new(26);
        let element = "Abz".to_string();
        assert_eq!(digitizer.digit_count(&element), 4);
        assert_eq!(digitizer.digit_at(&element, 0), 1);
        assert_eq!(digitizer.digit_at(&element, 1), 2);
        assert_eq!(digitizer.digit_at(&element, 2), 26);
        assert_eq!(digitizer.digit_at(&element, 3), 0);
        assert_eq!(digitizer.digit_at(&element, 100), 0);
    }

    #[test]
    fn test_string_digitizer_format() {
        let digitizer = StringDigitizer::new(26);
        let element = "Ab".to_string();
        assert_eq!(digitizer.format_digit(&element, 0), "a");
        assert_eq!(digitizer.format_digit(&element, 1), "b");
        assert_eq!(digitizer.format_digit(&element, 2), "#");
    }
}
