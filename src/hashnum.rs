//! Share-link hash.
//!
//! Polynomial rolling hash over the UTF-16 code units of the input, base 31.
//! Each term is reduced modulo 10^8 but the running sum is not, so long inputs
//! produce more than eight digits. Short results are left-padded with `'1'`.
//! Existing share links depend on this exact output; do not "fix" either quirk.

const BASE: u64 = 31;
const MODULUS: u64 = 100_000_000;
const MIN_WIDTH: usize = 8;

pub fn hashnum(input: &str) -> String {
    let mut pow: u64 = 1;
    let mut hash: u64 = 0;
    for unit in input.encode_utf16() {
        hash += (u64::from(unit) * pow) % MODULUS;
        pow = (pow * BASE) % MODULUS;
    }

    let digits = hash.to_string();
    if digits.len() >= MIN_WIDTH {
        return digits;
    }
    let mut padded = "1".repeat(MIN_WIDTH - digits.len());
    padded.push_str(&digits);
    padded
}
