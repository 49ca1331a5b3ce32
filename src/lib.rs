/*!
caminos-unitorus
=====

This crate builds the unidirectional k-ary n-cube of the CAMINOS simulator: the topology in which every dimension is a ring traversed in a single sense. It creates the routers, numbers and binds their channels with the proper latencies, and provides a dimension order routing for it.

# Usage

Add `caminos-unitorus` to the dependencies in your project's `Cargo.toml`.

```toml
[dependencies]
caminos-unitorus = "0.1"
```

Then register the routings of the topology into the plugs and build a network from its configuration.

```ignore
let mut plugs = Plugs::default();
register_routing_functions(&mut plugs);
let network = Network::new(&cv,&plugs)?;
```

The binary `unitorus` builds a network from command line options, see [`terminal_main`]. Set `RUST_LOG=debug` to follow the wiring of each router.

# Configuration Syntax

Networks are described by a tree of [`ConfigurationValue`](config::ConfigurationValue). Reading the configuration files is left to the simulator front-end.

```ignore
Configuration{
	topology: UnidirectionalTorus{
		k: 4,
		n: 2,
		use_noc_latency: false,
	},
	router: Basic,
	faults: Faults{
		link_failures: 2,
		fail_seed: 17,
	},
}
```

* `topology` is mandatory. See [`new_topology`](topology::new_topology).
* `router` defaults to `Basic`. See [`new_router`](router::new_router).
* `faults` is optional. See [`insert_random_faults`](network::insert_random_faults).

Routings are resolved by name with [`new_routing`](routing::new_routing). The unidirectional torus registers `dor_unidirectional_torus`.

# Plugging

Every builder looks into the [`Plugs`] before its predefined names. So new routers, topologies, and routings may be added by a final binary without modifying this crate.

*/

// --- crate attributes ---
// At clippy::style
	#![allow(clippy::needless_return)]
	#![allow(clippy::new_without_default)]
	#![allow(clippy::len_without_is_empty)]
	#![allow(clippy::needless_range_loop)]
	#![allow(clippy::match_ref_pats)]
	#![allow(clippy::tabs_in_doc_comments)]
// At clippy::complexity
	#![allow(clippy::type_complexity)]
// At clippy::cargo
	#![warn(clippy::cargo)]
	//missing repository and categories.
	#![allow(clippy::cargo_common_metadata)]

pub use quantifiable_derive::Quantifiable;//the derive macro

pub mod config;
pub mod error;
pub mod event;
pub mod quantify;
pub mod channel;
pub mod router;
pub mod routing;
pub mod topology;
pub mod network;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use config::ConfigurationValue;
use error::Error;
use network::Network;
use quantify::Quantifiable;
use router::{Router,RouterBuilderArgument};
use routing::{new_routing,Routing,RoutingBuilderArgument};
use topology::{Topology,TopologyBuilderArgument};
use topology::unidirectional_torus::{UnidirectionalTorus,ROUTING_NAME};

///The builder functions provided by the user, by name.
#[derive(Default)]
pub struct Plugs
{
	routers: BTreeMap<String, fn(RouterBuilderArgument) -> Result<Rc<RefCell<dyn Router>>,Error> >,
	topologies: BTreeMap<String, fn(TopologyBuilderArgument) -> Result<Box<dyn Topology>,Error> >,
	routings: BTreeMap<String, fn(RoutingBuilderArgument) -> Result<Box<dyn Routing>,Error> >,
}

impl Plugs
{
	pub fn add_router(&mut self, key:String, builder:fn(RouterBuilderArgument) -> Result<Rc<RefCell<dyn Router>>,Error>)
	{
		self.routers.insert(key,builder);
	}
	pub fn add_topology(&mut self, key:String, builder:fn(TopologyBuilderArgument) -> Result<Box<dyn Topology>,Error>)
	{
		self.topologies.insert(key,builder);
	}
	///Registering again a key replaces its builder.
	pub fn add_routing(&mut self, key:String, builder:fn(RoutingBuilderArgument) -> Result<Box<dyn Routing>,Error>)
	{
		self.routings.insert(key,builder);
	}
	pub fn router(&self, key:&str) -> Option<fn(RouterBuilderArgument) -> Result<Rc<RefCell<dyn Router>>,Error>>
	{
		self.routers.get(key).copied()
	}
	pub fn topology(&self, key:&str) -> Option<fn(TopologyBuilderArgument) -> Result<Box<dyn Topology>,Error>>
	{
		self.topologies.get(key).copied()
	}
	pub fn routing(&self, key:&str) -> Option<fn(RoutingBuilderArgument) -> Result<Box<dyn Routing>,Error>>
	{
		self.routings.get(key).copied()
	}
}

impl Debug for Plugs
{
	fn fmt(&self,f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error>
	{
		write!(f,"{};",self.routers.keys().map(|s|s.to_string()).collect::<Vec<String>>().join(","))?;
		write!(f,"{};",self.topologies.keys().map(|s|s.to_string()).collect::<Vec<String>>().join(","))?;
		write!(f,"{};",self.routings.keys().map(|s|s.to_string()).collect::<Vec<String>>().join(","))?;
		Ok(())
	}
}

///Register the routings of every topology in this crate.
pub fn register_routing_functions(plugs:&mut Plugs)
{
	UnidirectionalTorus::register_routing_functions(plugs);
}

pub fn terminal_default_options() -> getopts::Options
{
	let mut opts = getopts::Options::new();
	opts.optopt("k","radix","routers along each dimension (default 4)","K");
	opts.optopt("n","dimensions","number of dimensions (default 2)","N");
	opts.optflag("","noc","use on-chip latency for the links between routers");
	opts.optopt("","link-failures","number of links to mark as faulty","COUNT");
	opts.optopt("","fail-seed","seed for the selection of faulty links","SEED");
	opts.optopt("","export","file in which to write the list of channels","FILE");
	opts.optopt("","route","trace the route between two routers","SRC,DST");
	opts.optopt("","routing","routing used by --route (default dor_unidirectional_torus)","NAME");
	opts.optopt("","virtual-channels","virtual channels offered to the routing (default 2)","COUNT");
	opts.optflag("h","help","show this help");
	opts
}

///Read an option, using `default` when absent.
fn parse_option<T:FromStr>(matches:&getopts::Matches, name:&str, default:T) -> Result<T,Error>
{
	match matches.opt_str(name)
	{
		None => Ok(default),
		Some(text) => text.parse::<T>().map_err(|_|error!(bad_argument).with_message(format!("could not read --{} {}",name,text))),
	}
}

///The configuration the terminal options describe.
pub fn terminal_configuration(matches:&getopts::Matches) -> Result<ConfigurationValue,Error>
{
	let k:usize = parse_option(matches,"radix",4)?;
	let n:usize = parse_option(matches,"dimensions",2)?;
	let link_failures:usize = parse_option(matches,"link-failures",0)?;
	let fail_seed:usize = parse_option(matches,"fail-seed",0)?;
	let noc = if matches.opt_present("noc") { ConfigurationValue::True } else { ConfigurationValue::False };
	let mut pairs = vec![
		("topology".to_string(),ConfigurationValue::Object("UnidirectionalTorus".to_string(),vec![
			("k".to_string(),ConfigurationValue::Number(k as f64)),
			("n".to_string(),ConfigurationValue::Number(n as f64)),
			("use_noc_latency".to_string(),noc),
		])),
		("router".to_string(),ConfigurationValue::Object("Basic".to_string(),vec![])),
	];
	if link_failures>0
	{
		pairs.push(("faults".to_string(),ConfigurationValue::Object("Faults".to_string(),vec![
			("link_failures".to_string(),ConfigurationValue::Number(link_failures as f64)),
			("fail_seed".to_string(),ConfigurationValue::Number(fail_seed as f64)),
		])));
	}
	Ok(ConfigurationValue::Object("Configuration".to_string(),pairs))
}

///Main of the `unitorus` binary. `args` includes the program name.
///Builds the network described by the options, prints a summary, and optionally exports the channels and traces a route.
pub fn terminal_main(args:&[String], plugs:&Plugs) -> Result<(),Error>
{
	let opts = terminal_default_options();
	let matches = opts.parse(args.iter().skip(1)).map_err(|e|error!(bad_argument).with_message(e.to_string()))?;
	if matches.opt_present("help")
	{
		let program = args.first().map(|s|s.as_str()).unwrap_or("unitorus");
		print!("{}",opts.usage(&format!("Usage: {} [options]",program)));
		return Ok(());
	}
	let cv = terminal_configuration(&matches)?;
	let network = Network::new(&cv,plugs)?;
	let topology = network.topology();
	println!("{}",cv);
	println!("routers: {}, channels: {}, ports per router: {}, capacity: {}",topology.num_routers(),topology.num_channels(),topology.num_input_ports(0),topology.capacity());
	println!("faulty channels: {:?}",network.faulty_channels());
	println!("memory: {} bytes",network.total_memory());
	if let Some(path) = matches.opt_str("export")
	{
		let path = PathBuf::from(path);
		let mut file = File::create(&path).map_err(|e|error!(could_not_open_file,path.clone(),e))?;
		network.write_channels(&mut file).map_err(|e|error!(could_not_open_file,path.clone(),e))?;
		println!("channels written to {}",path.display());
	}
	if let Some(route) = matches.opt_str("route")
	{
		let (source,target) = route.split_once(',')
			.and_then(|(source,target)|Some( (source.trim().parse::<usize>().ok()?, target.trim().parse::<usize>().ok()?) ))
			.ok_or_else(||error!(bad_argument).with_message(format!("--route expects SRC,DST, not {}",route)))?;
		let routing_cv = ConfigurationValue::Literal(matches.opt_str("routing").unwrap_or_else(||ROUTING_NAME.to_string()));
		let mut routing = new_routing(RoutingBuilderArgument{cv:&routing_cv,plugs})?;
		routing.initialize(topology)?;
		let num_virtual_channels:usize = parse_option(&matches,"virtual-channels",2)?;
		let hops = network.trace_route(routing.as_ref(),source,target,num_virtual_channels)?;
		println!("route from {} to {} in {} hops:",source,target,hops.len()-1);
		for hop in hops
		{
			let router = network.routers()[hop.router].borrow();
			println!("\t{} port {} virtual channels {:?}{}",router.name(),hop.port,hop.virtual_channels,if hop.faulty {" (faulty)"} else {""});
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn terminal_options_describe_the_network()
	{
		let args = ["-k","3","-n","2","--noc","--link-failures","2","--fail-seed","5"];
		let matches = terminal_default_options().parse(args.iter()).unwrap();
		let cv = terminal_configuration(&matches).unwrap();
		let mut plugs = Plugs::default();
		register_routing_functions(&mut plugs);
		let network = Network::new(&cv,&plugs).unwrap();
		assert_eq!(network.topology().num_routers(),9);
		assert_eq!(network.faulty_channels().len(),2);
		assert_eq!(network.channels()[0].latency(),1);
		let bad = terminal_default_options().parse(["-k","three"].iter()).unwrap();
		assert!(terminal_configuration(&bad).is_err());
	}

	#[test]
	fn terminal_main_traces_routes()
	{
		let mut plugs = Plugs::default();
		register_routing_functions(&mut plugs);
		let args:Vec<String> = ["unitorus","-k","3","--route","0,8"].iter().map(|s|s.to_string()).collect();
		terminal_main(&args,&plugs).unwrap();
		let args:Vec<String> = ["unitorus","--route","0-8"].iter().map(|s|s.to_string()).collect();
		assert!(terminal_main(&args,&plugs).is_err());
		//Without registration the routing is unknown.
		let args:Vec<String> = ["unitorus","--route","0,1"].iter().map(|s|s.to_string()).collect();
		assert!(terminal_main(&args,&Plugs::default()).is_err());
	}
}
