//! Backend paths, relative to the configured API base URL.

pub const SIGN_IN: &str = "/auth/sign-in";
pub const SIGN_UP: &str = "/auth/sign-up";
pub const SIGN_OUT: &str = "/auth/sign-out";
pub const REFRESH: &str = "/auth/refresh";
pub const ME: &str = "/auth/me";

pub const GOOGLE: &str = "/auth/google";
pub const GOOGLE_PENDING_SIGN_UP: &str = "/auth/google/sign-up/pending";
pub const GOOGLE_SIGN_UP_COMPLETE: &str = "/auth/google/sign-up/complete";
pub const GOOGLE_PENDING_LINK: &str = "/auth/google/link-account/pending";
pub const GOOGLE_LINK_ACCOUNT: &str = "/auth/google/link-account";

pub const VERIFY_EMAIL_CODE: &str = "/auth/email/verify-verification-code";
pub const RESEND_VERIFICATION_EMAIL: &str = "/auth/email/resend-verification-email";
pub const VERIFICATION_EMAIL_COOLDOWN: &str = "/auth/email/resend-verification-email/cooldown";

pub const SEND_PASSWORD_RESET_EMAIL: &str = "/auth/password/send-reset-email";
pub const VERIFY_PASSWORD_RESET_CODE: &str = "/auth/password/verify-reset-code";
pub const RESET_PASSWORD: &str = "/auth/password/reset";
pub const PASSWORD_RESET_COOLDOWN: &str = "/auth/password/send-reset-email/cooldown";

/// Endpoints that establish or tear down credentials. A 401 from one of these
/// is the answer itself, so it never triggers a refresh.
const CREDENTIAL_ENDPOINTS: [&str; 4] = [SIGN_IN, SIGN_UP, REFRESH, SIGN_OUT];

pub fn is_credential_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    CREDENTIAL_ENDPOINTS.contains(&path)
}
