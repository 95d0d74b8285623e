use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Form fields arrive as optional strings so that a missing field becomes a
/// field error instead of a deserialization failure.
#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub redirect_to: Option<String>,
    pub remember: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSellerForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    /// `Faculty` or `Student`.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub address: Option<String>,
    pub phone_no: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub address: Option<String>,
    pub phone_no: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub user_id: Uuid,
    pub password: Option<String>,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveSellerForm {
    pub seller_id: Option<String>,
}
