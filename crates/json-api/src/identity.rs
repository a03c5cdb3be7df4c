//! Identity middleware.
//!
//! Authentication happens upstream; the gateway asserts the acting user through
//! the `x-user-id` header and this middleware records it in the depot.

use salvo::prelude::*;
use uuid::Uuid;

use huerto_app::domain::users::records::UserUuid;

use crate::extensions::*;

pub(crate) const USER_ID_HEADER: &str = "x-user-id";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if let Some(value) = req.header::<String>(USER_ID_HEADER) {
        let Ok(uuid) = Uuid::parse_str(value.trim()) else {
            res.render(StatusError::bad_request().brief("Invalid x-user-id header"));
            ctrl.skip_rest();

            return;
        };

        depot.insert_user_uuid(UserUuid::from_uuid(uuid));
    }

    ctrl.call_next(req, depot, res).await;
}
