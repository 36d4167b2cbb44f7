pub mod login;
pub mod logout;
pub mod profile;
pub mod refresh;
pub mod request_code;
