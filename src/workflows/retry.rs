/// Runs `op` until it succeeds, it fails non-transiently, or `max_attempts`
/// is exhausted. `pause` runs between attempts with the number of the attempt
/// that just failed and its error; the caller decides whether that sleeps,
/// prints, or does nothing.
pub fn with_retries<T, E>(
    max_attempts: u32,
    mut op: impl FnMut() -> Result<T, E>,
    is_transient: impl Fn(&E) -> bool,
    mut pause: impl FnMut(u32, &E),
) -> Result<T, E> {
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) && attempt < max_attempts => {
                pause(attempt, &e);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
