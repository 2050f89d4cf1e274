use hi_cubes::{app::Application, config::Config, flow, pipelines::program::ShaderError};

fn main() {
    flow::init_logger();
    let config = Config::from_args(std::env::args());

    if let Err(e) = flow::run(config, Application::constructor()) {
        if let Some(shader_error) = e.downcast_ref::<ShaderError>() {
            eprintln!("{}", shader_error);
            eprintln!("One or more shaders failed to compile... exiting!");
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
