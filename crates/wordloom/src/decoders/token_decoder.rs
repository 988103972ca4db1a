//! # Token to Text Decoder

use crate::{pretokenizers::restore_sentinels, types::TokenType, vocab::TokenVocab};

/// Decode one token, appending its display text to `buf`.
///
/// ## Returns
/// `false` if the token is unknown; nothing is appended.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(vocab, buf)))]
pub fn decode_append<T: TokenType>(
    token: T,
    vocab: &TokenVocab<T>,
    buf: &mut String,
) -> bool {
    match vocab.lookup_word(token) {
        Some(word) => {
            buf.push_str(&restore_sentinels(word));
            true
        }
        None => {
            log::trace!("Skipping unknown token {token}");
            false
        }
    }
}

/// Decode tokens to display text.
///
/// Sentinels are substituted back to spaces and newlines;
/// unknown tokens contribute nothing.
pub fn decode<T: TokenType>(
    tokens: &[T],
    vocab: &TokenVocab<T>,
) -> String {
    let mut buf = String::new();
    for &token in tokens {
        decode_append(token, vocab, &mut buf);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let vocab: TokenVocab<u32> = [("<|endoftext|>", 0), ("Ġhi", 1), ("Ċ", 2), ("!", 3)]
            .into_iter()
            .collect();

        assert_eq!(decode(&[1, 3, 2], &vocab), " hi!\n");
        assert_eq!(decode(&[0], &vocab), "<|endoftext|>");
        assert_eq!(decode::<u32>(&[], &vocab), "");
    }

    #[test]
    fn test_decode_skips_unknown() {
        let vocab: TokenVocab<u16> = [("a", 1)].into_iter().collect();

        let mut buf = String::from(">");
        assert!(!decode_append(42, &vocab, &mut buf));
        assert!(decode_append(1, &vocab, &mut buf));
        assert_eq!(buf, ">a");

        assert_eq!(decode(&[42, 1, 0], &vocab), "a");
    }
}
