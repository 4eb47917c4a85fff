use rand::Rng;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_+=";

pub const TEMP_PASSWORD_LEN: usize = 16;

/// Generate a temporary password for a freshly provisioned leader account.
///
/// Always 16 characters with at least one character from each of the four
/// classes, drawn from the thread-local CSPRNG and shuffled so the
/// class-guaranteed characters don't cluster at the front.
pub fn generate() -> String {
    let mut rng = rand::rng();

    let mut chars: Vec<u8> = Vec::with_capacity(TEMP_PASSWORD_LEN);
    for class in [LOWER, UPPER, DIGITS, SYMBOLS] {
        chars.push(class[rng.random_range(0..class.len())]);
    }

    let all: Vec<u8> = [LOWER, UPPER, DIGITS, SYMBOLS].concat();
    while chars.len() < TEMP_PASSWORD_LEN {
        chars.push(all[rng.random_range(0..all.len())]);
    }

    // Fisher-Yates
    for i in (1..chars.len()).rev() {
        let j = rng.random_range(0..=i);
        chars.swap(i, j);
    }

    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_credential_has_expected_length() {
        assert_eq!(generate().len(), TEMP_PASSWORD_LEN);
        assert!(TEMP_PASSWORD_LEN >= 12);
    }

    #[test]
    fn generated_credential_covers_all_character_classes() {
        let credential = generate();
        assert!(credential.bytes().any(|b| LOWER.contains(&b)));
        assert!(credential.bytes().any(|b| UPPER.contains(&b)));
        assert!(credential.bytes().any(|b| DIGITS.contains(&b)));
        assert!(credential.bytes().any(|b| SYMBOLS.contains(&b)));
    }

    #[test]
    fn generated_credentials_are_not_repeated() {
        let credentials: Vec<String> = (0..100).map(|_| generate()).collect();
        let unique: std::collections::HashSet<_> = credentials.iter().collect();
        assert_eq!(unique.len(), credentials.len());
    }
}
