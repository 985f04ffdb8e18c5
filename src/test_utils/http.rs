use axum_test::TestServer;

use crate::{AppState, build_router};

#[track_caller]
pub(crate) fn new_test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state))
}
