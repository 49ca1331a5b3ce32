
use caminos_unitorus::{register_routing_functions,terminal_main,Plugs};

fn main()
{
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_|"caminos_unitorus=info".into()),
		)
		.init();
	let args: Vec<String> = std::env::args().collect();
	let mut plugs = Plugs::default();
	register_routing_functions(&mut plugs);
	if let Err(error) = terminal_main(&args,&plugs)
	{
		eprintln!("Error: {}",error);
		std::process::exit(1);
	}
}
