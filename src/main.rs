fn main() {
    if let Err(err) = cwl_svg_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
