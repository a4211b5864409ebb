use microhom::base::StrainPathInput;
use microhom::homogenization::Homogenizer;
use microhom::micro::Laminate;
use microhom::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "microhom_strain_path",
    about = "Drives a single macro integration point along a cyclic strain path"
)]
struct Options {
    /// Input file (JSON)
    input: String,

    /// Prints the convergence table after each step
    #[structopt(short, long)]
    verbose: bool,
}

fn main() -> Result<(), StrError> {
    // parse options
    env_logger::init();
    let options = Options::from_args();

    // load data
    let mut input = StrainPathInput::from(&options.input)?;
    if let Some(msg) = input.validate() {
        log::error!("{}", msg);
        return Err("cannot run the strain path because input.validate() failed");
    }
    input.config.verbose = options.verbose;

    // allocate the engine
    let laminate = Laminate::new(&input.config, &input.laminate)?;
    let mut homogenizer = Homogenizer::new(&input.config, laminate)?;
    homogenizer.calibrate()?;

    // run the path
    let id = 1;
    let c = input.path.component;
    println!(
        "{:>5} {:>13} {:>13} {:>13} {:>10} {:>5}",
        "step", "ε", "σ", "dσ/dε", "path", "iter"
    );
    for (step, strain) in input.path.generate(input.config.nvoi()).iter().enumerate() {
        homogenizer.set_macro_strain(id, strain.as_data())?;
        homogenizer.localize_homogenize()?;
        let nvoi = strain.dim();
        let sigma = homogenizer.get_macro_stress(id)?[c];
        let ctan = homogenizer.get_macro_ctan(id)?[c * nvoi + c];
        let path = match homogenizer.get_path(id)? {
            Some(p) => format!("{}", p),
            None => "-".to_string(),
        };
        let iterations = homogenizer.get_convergence(id)?.iterations;
        println!(
            "{:>5} {:>13.6e} {:>13.6e} {:>13.6e} {:>10} {:>5}",
            step + 1,
            strain[c],
            sigma,
            ctan,
            path,
            iterations
        );
        homogenizer.update_internal_variables();
    }

    // message
    match homogenizer.get_committed_internal_values(id)? {
        Some(values) => println!("\nfinal internal values = {:?}", values),
        None => println!("\nthe integration point has never left the elastic regime"),
    }
    Ok(())
}
