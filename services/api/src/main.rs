use growth_velocity_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("growth velocity error: {err}");
        std::process::exit(1);
    }
}
