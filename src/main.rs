#[rocket::launch]
fn rocket() -> _ {
    identity_api::rocket()
}
