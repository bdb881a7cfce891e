mod common;
mod health_test;
mod remote_form_test;
