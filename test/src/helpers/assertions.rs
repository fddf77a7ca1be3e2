/// Assert that every client's mirror of an entity matches the host's root
#[macro_export]
macro_rules! assert_converged {
    ($session:expr, $entity:expr) => {
        if let Err(message) = $session.check_converged($entity) {
            panic!("{}", message);
        }
    };
}
