use node_compiler::CompileError;
use node_compiler::run;

fn main() -> Result<(), CompileError> {
    env_logger::init();
    run(std::env::args().collect())
}
