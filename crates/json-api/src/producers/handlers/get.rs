//! Get Producer Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use huerto_app::domain::users::records::ProducerProfile;

use crate::{
    extensions::*, producers::errors::into_status_error, products::get::ProductResponse,
    state::State,
};

/// Producer Profile Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProducerResponse {
    pub id: Uuid,

    pub name: String,

    pub location: Option<String>,

    pub description: Option<String>,

    pub image_url: Option<String>,

    /// Every product the producer owns, including inactive ones
    pub products: Vec<ProductResponse>,
}

impl From<ProducerProfile> for ProducerResponse {
    fn from(profile: ProducerProfile) -> Self {
        let producer = profile.producer;

        ProducerResponse {
            id: producer.uuid.into(),
            name: producer.name,
            location: producer.location,
            description: producer.description,
            image_url: producer.image_url,
            products: profile.products.into_iter().map(Into::into).collect(),
        }
    }
}

/// Get Producer Handler
///
/// Returns a producer's public profile and their products.
#[endpoint(
    tags("producers"),
    summary = "Get Producer",
    responses(
        (status_code = StatusCode::OK, description = "Producer found"),
        (status_code = StatusCode::NOT_FOUND, description = "Producer not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    producer: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProducerResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let profile = state
        .app
        .users
        .get_producer_profile(producer.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(profile.into()))
}
