//! Staff bearer token middleware.

use std::sync::Arc;

use bazaar_app::domain::staff::StaffServiceError;
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::{debug, error};

use crate::{extensions::*, state::State};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(token) = extract_bearer_token(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));
        ctrl.skip_rest();

        return;
    };

    let state = match depot.obtain::<Arc<State>>() {
        Ok(state) => state,
        Err(_error) => {
            res.render(StatusError::internal_server_error());
            ctrl.skip_rest();

            return;
        }
    };

    let staff_token = match state.app.staff.authenticate_bearer(token).await {
        Ok(record) => record,
        Err(StaffServiceError::Unauthorized | StaffServiceError::NotFound) => {
            res.render(StatusError::unauthorized().brief("Invalid staff token"));
            ctrl.skip_rest();

            return;
        }
        Err(source) => {
            error!("failed to validate staff token: {source}");

            res.render(StatusError::internal_server_error());
            ctrl.skip_rest();

            return;
        }
    };

    debug!(staff_token_uuid = %staff_token.uuid, "authenticated staff request");

    depot.insert_staff_token(staff_token.uuid);

    ctrl.call_next(req, depot, res).await;
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use bazaar_app::domain::staff::{
        MockStaffService,
        records::{StaffTokenRecord, StaffTokenUuid},
    };
    use jiff::Timestamp;
    use salvo::{
        affix_state::inject,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::test_helpers::state_with_staff;

    use super::*;

    const TOKEN: &str = "bz_0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[salvo::handler]
    async fn echo_staff_token(depot: &mut Depot, res: &mut Response) {
        let staff = depot
            .staff_token_or_401()
            .ok()
            .map_or_else(|| "missing".to_string(), |uuid| uuid.to_string());

        res.render(staff);
    }

    fn make_service(staff: MockStaffService) -> Service {
        let router = Router::new()
            .hoop(inject(state_with_staff(staff)))
            .hoop(handler)
            .push(Router::new().get(echo_staff_token));

        Service::new(router)
    }

    fn token_record(uuid: StaffTokenUuid) -> StaffTokenRecord {
        StaffTokenRecord {
            uuid,
            label: "warehouse".to_string(),
            created_at: Timestamp::UNIX_EPOCH,
            last_used_at: None,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_missing_authorization_header_returns_401() {
        let mut staff = MockStaffService::new();

        staff.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com")
            .send(&make_service(staff))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_non_bearer_authorization_header_returns_401() {
        let mut staff = MockStaffService::new();

        staff.expect_authenticate_bearer().never();

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, "Basic abc123", true)
            .send(&make_service(staff))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_revoked_token_returns_401() {
        let mut staff = MockStaffService::new();

        staff
            .expect_authenticate_bearer()
            .once()
            .withf(|token| token == TOKEN)
            .return_once(|_| Err(StaffServiceError::Unauthorized));

        let res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, format!("Bearer {TOKEN}"), true)
            .send(&make_service(staff))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn test_valid_token_injects_staff_token() -> TestResult {
        let uuid = StaffTokenUuid::from_uuid(Uuid::nil());

        let mut staff = MockStaffService::new();

        staff
            .expect_authenticate_bearer()
            .once()
            .withf(|token| token == TOKEN)
            .return_once(move |_| Ok(token_record(uuid)));

        let mut res = TestClient::get("http://example.com")
            .add_header(AUTHORIZATION, format!("bearer {TOKEN}"), true)
            .send(&make_service(staff))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, uuid.to_string());

        Ok(())
    }
}
