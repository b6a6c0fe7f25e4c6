use river_gto::cli;

fn main() {
    cli::run();
}
