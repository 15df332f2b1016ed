use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::ExportSettings,
    routes::{default_route, lookup_route},
    services::Pipeline,
};

pub fn run(
    listener: TcpListener,
    pipeline: Pipeline,
    export: ExportSettings,
) -> Result<Server, std::io::Error> {
    let pipeline = web::Data::new(pipeline);
    let export = web::Data::new(export);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(
                web::scope("/lookup")
                    .service(lookup_route::lookup)
                    .service(lookup_route::upload),
            )
            .app_data(pipeline.clone())
            .app_data(export.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
