use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of each random token.
const TOKEN_LEN: usize = 13;

/// Generates `<token><token>_<unix-millis>.pdf`.
pub fn generate_object_key() -> String {
    let mut rng = rand::rng();
    let first = base36_token(&mut rng);
    let second = base36_token(&mut rng);
    format!(
        "{first}{second}_{}.pdf",
        chrono::Utc::now().timestamp_millis()
    )
}

fn base36_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}
