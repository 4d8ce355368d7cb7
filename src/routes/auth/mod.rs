mod handler;
mod model;
mod pages;

pub use handler::{
    forgot_password,
    get_profile,
    login,
    register,
    resend_verification,
    reset_password,
    reset_password_form,
    update_profile,
    verify_email,
};
