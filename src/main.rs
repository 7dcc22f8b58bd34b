mod core;
mod kernel;
mod net;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let kernel = kernel::boot().await?;
    kernel.setup_http_adapter().run().await
}
