use rand::Rng;

/// Upper-case letters and digits without 0, O, 1 and I.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub(crate) const COURSE_CODE_LEN: usize = 6;

pub(crate) fn generate_course_code() -> String {
    let mut rng = rand::thread_rng();
    let mut output = String::with_capacity(COURSE_CODE_LEN);
    for _ in 0..COURSE_CODE_LEN {
        let index = rng.gen_range(0..ALPHABET.len());
        output.push(ALPHABET[index] as char);
    }
    output
}

pub(crate) fn normalize_course_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_uses_alphabet() {
        for _ in 0..64 {
            let code = generate_course_code();
            assert_eq!(code.len(), COURSE_CODE_LEN);
            assert!(code.bytes().all(|byte| ALPHABET.contains(&byte)), "bad code {code}");
        }
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_course_code("  ab3kq9 "), "AB3KQ9");
    }
}
