use tabstats_app_api::AppContext;

#[derive(Clone)]
pub struct HttpState {
    pub context: AppContext,
}

impl HttpState {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }
}
