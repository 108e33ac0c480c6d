//! Client-side generation of store child keys.
//!
//! Keys are 20 characters: 8 characters encode the timestamp in a
//! lexicographically ordered 64-character alphabet, followed by 12 random
//! characters. Keys generated within the same millisecond reuse the previous
//! random suffix incremented by one, so key order always matches generation
//! order.

use std::cell::RefCell;

use chrono::Utc;
use uuid::Uuid;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

thread_local! {
    static LAST: RefCell<(i64, [u8; 12])> = const { RefCell::new((-1, [0; 12])) };
}

#[must_use]
pub fn generate_now() -> String {
    generate(Utc::now().timestamp_millis())
}

#[must_use]
pub fn generate(timestamp_ms: i64) -> String {
    LAST.with_borrow_mut(|(last_timestamp, suffix)| {
        if timestamp_ms == *last_timestamp {
            increment(suffix);
        } else {
            *last_timestamp = timestamp_ms;
            let entropy = Uuid::new_v4().into_bytes();
            for (value, byte) in suffix.iter_mut().zip(entropy) {
                *value = byte & 63;
            }
        }

        let mut key = Vec::with_capacity(20);
        let mut remaining = timestamp_ms;
        for _ in 0..8 {
            #[allow(clippy::cast_sign_loss)]
            key.push(PUSH_CHARS[(remaining % 64) as usize]);
            remaining /= 64;
        }
        key.reverse();
        key.extend(suffix.iter().map(|value| PUSH_CHARS[*value as usize]));

        String::from_utf8(key).expect("push chars are ASCII")
    })
}

fn increment(suffix: &mut [u8; 12]) {
    for value in suffix.iter_mut().rev() {
        if *value < 63 {
            *value += 1;
            return;
        }
        *value = 0;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_generate_shape() {
        let key = generate(1_700_000_000_000);
        assert_eq!(key.len(), 20);
        assert!(key.bytes().all(|byte| PUSH_CHARS.contains(&byte)));
    }

    #[test]
    fn test_generate_orders_by_timestamp() {
        let earlier = generate(1_700_000_000_000);
        let later = generate(1_700_000_000_001);
        assert!(earlier < later);
    }

    #[test]
    fn test_generate_orders_within_same_millisecond() {
        let first = generate(1_700_000_000_002);
        let second = generate(1_700_000_000_002);
        let third = generate(1_700_000_000_002);
        assert!(first < second);
        assert!(second < third);
        assert_eq!(first[..8], second[..8]);
    }

    #[test]
    fn test_increment_carries() {
        let mut suffix = [63; 12];
        suffix[0] = 1;
        increment(&mut suffix);
        assert_eq!(suffix, [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }
}
