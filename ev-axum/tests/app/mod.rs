use ev_core::ports::{Application, ContestRepository};
use headers::{Authorization, authorization::Bearer};

// Tests stuff a plain-text role into the bearer token: `admin` may manage
// submissions and categories, anything else may not.
pub const ADMIN: &str = "admin";

#[derive(Clone)]
pub struct TestApp<R>(pub R);

impl<R: ContestRepository> Application for TestApp<R> {
    type Context = Authorization<Bearer>;
    type Repository = R;

    fn database(&self) -> &Self::Repository {
        &self.0
    }

    async fn is_admin(&self, context: &Self::Context) -> bool {
        context.token() == ADMIN
    }
}
