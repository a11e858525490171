use rocket::data::{ByteUnit, Data, FromData, Outcome};
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::serde_json;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::request::OpenApiFromData;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::ops::Deref;
use tracing::warn;

/// A JSON body guard that answers missing or malformed payloads with a 400
/// instead of Rocket's default 422, logging the parse failure.
///
/// Required fields are part of request validation here: a body that fails to
/// deserialize gets the same status as one that fails `validate()`.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T> Deref for JsonBody<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T: DeserializeOwned> FromData<'r> for JsonBody<T> {
    type Error = serde_json::Error;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        let limit = req.limits().get("json").unwrap_or(ByteUnit::Mebibyte(1));

        let bytes = match data.open(limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => {
                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    "JSON payload exceeded size limit"
                );
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    serde_json::Error::io(std::io::Error::new(std::io::ErrorKind::Other, "payload too large")),
                ));
            }
            Err(e) => {
                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    error = %e,
                    "Failed to read request body"
                );
                return Outcome::Error((Status::BadRequest, serde_json::Error::io(e)));
            }
        };

        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Outcome::Success(JsonBody(value)),
            Err(e) => {
                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    error_message = %e,
                    error_category = ?e.classify(),
                    "Failed to parse JSON request body"
                );
                Outcome::Error((Status::BadRequest, e))
            }
        }
    }
}

impl<'r, T: DeserializeOwned + JsonSchema> OpenApiFromData<'r> for JsonBody<T> {
    fn request_body(r#gen: &mut OpenApiGenerator) -> rocket_okapi::Result<rocket_okapi::okapi::openapi3::RequestBody> {
        // Same body schema as the plain Json guard
        <rocket::serde::json::Json<T> as OpenApiFromData>::request_body(r#gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use rocket::serde::json::Json;
    use rocket::{post, routes};
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct EchoRequest {
        message: String,
    }

    #[post("/echo", data = "<payload>")]
    fn echo(payload: JsonBody<EchoRequest>) -> Json<String> {
        Json(payload.message.clone())
    }

    async fn test_client() -> Client {
        let rocket = rocket::build().mount("/", routes![echo]);
        Client::tracked(rocket).await.expect("valid rocket instance")
    }

    #[rocket::async_test]
    async fn well_formed_body_parses() {
        let client = test_client().await;
        let response = client
            .post("/echo")
            .header(ContentType::JSON)
            .body(r#"{"message":"hello"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "\"hello\"");
    }

    #[rocket::async_test]
    async fn missing_field_is_a_bad_request() {
        let client = test_client().await;
        let response = client.post("/echo").header(ContentType::JSON).body(r#"{}"#).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn invalid_json_is_a_bad_request() {
        let client = test_client().await;
        let response = client.post("/echo").header(ContentType::JSON).body("not json").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
    }
}
