
/*!

The network: the owner of the topology, the routers, and every channel.

A network is built from a configuration like the following.
```ignore
Configuration{
	topology: UnidirectionalTorus{ k:4, n:2, use_noc_latency:false },
	router: Basic,//optional
	faults: Faults{ link_failures:2, fail_seed:17 },//optional
}
```
Construction allocates the channels, lets the topology create and wire the routers, verifies that every port and channel is bound, and finally inserts the requested faults. A network is never returned partially wired.

*/

use std::cell::RefCell;
use std::io::{self,Write};
use std::mem::size_of;
use std::rc::Rc;

use itertools::Itertools;
use rand::{rngs::StdRng,SeedableRng};
use tracing::{info,warn};

use crate::channel::{ChannelKind,ChannelPair,Endpoint};
use crate::config::ConfigurationValue;
use crate::error::Error;
use crate::quantify::Quantifiable;
use crate::router::Router;
use crate::routing::{Routing,RoutingInfo};
use crate::topology::{new_topology,Topology,TopologyBuilderArgument,WiringArgument};
use crate::{error,match_object,Plugs};

pub struct Network
{
	topology: Box<dyn Topology>,
	///The routers, in router index order.
	routers: Vec<Rc<RefCell<dyn Router>>>,
	///The channels between routers, by channel index.
	channels: Vec<ChannelPair>,
	injection: Vec<ChannelPair>,
	ejection: Vec<ChannelPair>,
	///Indices of the channels marked faulty, in increasing order.
	faulty: Vec<usize>,
}

///A step of a traced route.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Hop
{
	pub router: usize,
	///The output port taken.
	pub port: usize,
	///The virtual channels offered at that port.
	pub virtual_channels: Vec<usize>,
	///Whether the channel behind the port is marked faulty.
	pub faulty: bool,
}

impl Network
{
	pub fn new(cv:&ConfigurationValue, plugs:&Plugs) -> Result<Network,Error>
	{
		let mut topology_cv=None;
		let mut router_cv=None;
		let mut faults_cv=None;
		match_object!(cv,"Configuration",value,
			"topology" => topology_cv=Some(value),
			"router" => router_cv=Some(value),
			"faults" => faults_cv=Some(value),
		);
		let topology_cv=topology_cv.ok_or_else(||cv.ill("There were no topology"))?;
		let default_router=ConfigurationValue::Object("Basic".to_string(),vec![]);
		let router_cv=router_cv.unwrap_or(&default_router);
		let topology=new_topology(TopologyBuilderArgument{cv:topology_cv,plugs})?;
		Network::with_topology(topology,router_cv,plugs,faults_cv)
	}
	///Build the network over an already created topology.
	pub fn with_topology(topology:Box<dyn Topology>, router_cv:&ConfigurationValue, plugs:&Plugs, faults:Option<&ConfigurationValue>) -> Result<Network,Error>
	{
		let num_routers = topology.num_routers();
		let channels = (0..topology.num_channels()).map(|index|ChannelPair::new(ChannelKind::Torus,index)).collect();
		let injection = (0..num_routers).map(|index|ChannelPair::new(ChannelKind::Injection,index)).collect();
		let ejection = (0..num_routers).map(|index|ChannelPair::new(ChannelKind::Ejection,index)).collect();
		let mut network = Network{
			topology,
			routers: Vec::with_capacity(num_routers),
			channels,
			injection,
			ejection,
			faulty: vec![],
		};
		network.topology.build(WiringArgument{
			router_cv,
			plugs,
			routers: &mut network.routers,
			channels: &network.channels,
			injection: &network.injection,
			ejection: &network.ejection,
		})?;
		network.check_bindings()?;
		if let Some(faults) = faults
		{
			network.faulty = network.topology.insert_random_faults(&network.channels,faults)?;
		}
		info!(routers=num_routers, channels=network.channels.len(), faulty=network.faulty.len(), "network built");
		Ok(network)
	}
	pub fn topology(&self) -> &dyn Topology
	{
		self.topology.as_ref()
	}
	pub fn routers(&self) -> &[Rc<RefCell<dyn Router>>]
	{
		&self.routers
	}
	pub fn channels(&self) -> &[ChannelPair]
	{
		&self.channels
	}
	pub fn injection_channels(&self) -> &[ChannelPair]
	{
		&self.injection
	}
	pub fn ejection_channels(&self) -> &[ChannelPair]
	{
		&self.ejection
	}
	pub fn faulty_channels(&self) -> &[usize]
	{
		&self.faulty
	}
	///Verify that every router port holds a channel and that every channel is bound at the ends its kind requires, to the router reporting it.
	pub fn check_bindings(&self) -> Result<(),Error>
	{
		let num_routers = self.topology.num_routers();
		if self.routers.len()!=num_routers
		{
			return Err(error!(binding_mismatch,"routers".to_string()).with_message(format!("the topology created {} routers instead of {}",self.routers.len(),num_routers)));
		}
		for (router_index,router) in self.routers.iter().enumerate()
		{
			let router = router.borrow();
			if router.router_index()!=router_index
				|| router.num_input_ports()!=self.topology.num_input_ports(router_index)
				|| router.num_output_ports()!=self.topology.num_output_ports(router_index)
			{
				return Err(error!(binding_mismatch,router.name().to_string()).with_message(format!("router at position {} does not match the topology",router_index)));
			}
			if let Some(port) = (0..router.num_input_ports()).find(|&port|router.input_channel(port).is_none())
			{
				return Err(error!(binding_mismatch,router.name().to_string()).with_message(format!("input port {} is unbound",port)));
			}
			if let Some(port) = (0..router.num_output_ports()).find(|&port|router.output_channel(port).is_none())
			{
				return Err(error!(binding_mismatch,router.name().to_string()).with_message(format!("output port {} is unbound",port)));
			}
		}
		for pair in self.channels.iter()
		{
			let source = pair.source().ok_or_else(||unbound(pair,"source"))?;
			let sink = pair.sink().ok_or_else(||unbound(pair,"sink"))?;
			self.check_endpoint(pair,source,true)?;
			self.check_endpoint(pair,sink,false)?;
		}
		for pair in self.injection.iter()
		{
			if pair.source().is_some()
			{
				return Err(error!(binding_mismatch,format!("injection {}",pair.index())).with_message("injection channels are not sent by routers".to_string()));
			}
			let sink = pair.sink().ok_or_else(||unbound(pair,"sink"))?;
			self.check_endpoint(pair,sink,false)?;
		}
		for pair in self.ejection.iter()
		{
			if pair.sink().is_some()
			{
				return Err(error!(binding_mismatch,format!("ejection {}",pair.index())).with_message("ejection channels are not received by routers".to_string()));
			}
			let source = pair.source().ok_or_else(||unbound(pair,"source"))?;
			self.check_endpoint(pair,source,true)?;
		}
		let unique_sources = self.channels.iter().chain(self.ejection.iter()).map(|pair|pair.source()).all_unique();
		let unique_sinks = self.channels.iter().chain(self.injection.iter()).map(|pair|pair.sink()).all_unique();
		if !unique_sources || !unique_sinks
		{
			return Err(error!(binding_mismatch,"ports".to_string()).with_message("a router port is bound to several channels".to_string()));
		}
		Ok(())
	}
	///Check that the router at `endpoint` has `pair` at that port.
	fn check_endpoint(&self, pair:&ChannelPair, endpoint:Endpoint, as_output:bool) -> Result<(),Error>
	{
		let router = self.routers.get(endpoint.router_index).ok_or_else(||error!(binding_mismatch,format!("{} {}",pair.kind(),pair.index())).with_message(format!("bound to nonexistent router {}",endpoint.router_index)))?;
		let router = router.borrow();
		let bound = if as_output { router.output_channel(endpoint.port) } else { router.input_channel(endpoint.port) };
		match bound
		{
			Some(other) if Rc::ptr_eq(&other.data,&pair.data) => Ok(()),
			_ => Err(error!(binding_mismatch,format!("{} {}",pair.kind(),pair.index())).with_message(format!("{} does not hold it at port {}",router.name(),endpoint.port))),
		}
	}
	///Write a line per channel: `kind index source_router source_port sink_router sink_port latency fault`.
	///Unbound ends are written as `-`.
	pub fn write_channels(&self, output:&mut dyn Write) -> io::Result<()>
	{
		let endpoint = |endpoint:Option<Endpoint>| match endpoint
		{
			Some(Endpoint{router_index,port}) => format!("{} {}",router_index,port),
			None => "- -".to_string(),
		};
		for pair in self.channels.iter().chain(self.injection.iter()).chain(self.ejection.iter())
		{
			writeln!(output,"{} {} {} {} {} {}",pair.kind(),pair.index(),endpoint(pair.source()),endpoint(pair.sink()),pair.latency(),pair.is_faulty())?;
		}
		Ok(())
	}
	///Follow the candidates of `routing` from the router `source` until a packet to `target` is ejected.
	///The first candidate port is taken at each router. The routing must have been initialized with the topology of this network.
	pub fn trace_route(&self, routing:&dyn Routing, source:usize, target:usize, num_virtual_channels:usize) -> Result<Vec<Hop>,Error>
	{
		let num_routers = self.topology.num_routers();
		if source>=num_routers || target>=num_routers
		{
			return Err(error!(bad_argument).with_message(format!("route from {} to {} in a network of {} routers",source,target,num_routers)));
		}
		let topology = self.topology.as_ref();
		let routing_info = RefCell::new(RoutingInfo::new());
		routing.initialize_routing_info(&routing_info,topology,source,target)?;
		let mut route = vec![];
		let mut current = source;
		loop
		{
			//Any route longer than the amount of links is revisiting some link.
			if route.len()>self.channels.len()
			{
				return Err(error!(undetermined).with_message(format!("the route from {} to {} does not reach its destination",source,target)));
			}
			let candidates = routing.next(&routing_info.borrow(),topology,current,target,num_virtual_channels)?;
			let port = candidates.candidates.first().map(|candidate|candidate.port).ok_or_else(||error!(undetermined).with_message(format!("no candidates at router {} towards {}",current,target)))?;
			let virtual_channels = candidates.into_iter().filter(|candidate|candidate.port==port).map(|candidate|candidate.virtual_channel).collect();
			let pair = self.routers[current].borrow().output_channel(port).cloned().ok_or_else(||error!(bad_argument).with_message(format!("router {} has no output port {}",current,port)))?;
			route.push(Hop{router:current,port,virtual_channels,faulty:pair.is_faulty()});
			if pair.kind()==ChannelKind::Ejection
			{
				if current!=target
				{
					return Err(error!(undetermined).with_message(format!("ejected at router {} instead of {}",current,target)));
				}
				return Ok(route);
			}
			let sink = pair.sink().ok_or_else(||unbound(&pair,"sink"))?;
			routing.update_routing_info(&routing_info,topology,sink.router_index,sink.port,target)?;
			current = sink.router_index;
		}
	}
}

fn unbound(pair:&ChannelPair, side:&str) -> Error
{
	error!(binding_mismatch,format!("{} {}",pair.kind(),pair.index())).with_message(format!("its {} is unbound",side))
}

/**Mark random links as faulty.

```ignore
Faults{
	link_failures: 2,
	fail_seed: 17,//defaults to 0
}
```

The `link_failures` channels are distinct and drawn uniformly from `channels`; the same seed always selects the same channels. Both the data and the credit channels of each selected pair are marked.
Returns the selected indices in increasing order.
**/
pub fn insert_random_faults(channels:&[ChannelPair], cv:&ConfigurationValue) -> Result<Vec<usize>,Error>
{
	let mut link_failures=0;
	let mut fail_seed=0;
	match_object!(cv,"Faults",value,
		"link_failures" => link_failures=value.as_usize()?,
		"fail_seed" => fail_seed=value.as_usize()?,
	);
	if link_failures>channels.len()
	{
		return Err(cv.ill(&format!("cannot fail {} links out of {}",link_failures,channels.len())));
	}
	if link_failures==0
	{
		return Ok(vec![]);
	}
	let mut rng = StdRng::seed_from_u64(fail_seed as u64);
	let mut selected = rand::seq::index::sample(&mut rng,channels.len(),link_failures).into_vec();
	selected.sort_unstable();
	for &index in selected.iter()
	{
		channels[index].set_fault(true);
		warn!(channel=index, "link marked as faulty");
	}
	Ok(selected)
}

impl Quantifiable for Network
{
	fn total_memory(&self) -> usize
	{
		size_of::<Network>()
			+ self.topology.total_memory()
			+ self.routers.total_memory()
			+ self.channels.total_memory()
			+ self.injection.total_memory()
			+ self.ejection.total_memory()
			+ self.faulty.total_memory()
	}
	fn print_memory_breakdown(&self)
	{
		println!("Memory breakdown of the network:");
		println!("topology: {}",self.topology.total_memory());
		println!("routers: {}",self.routers.total_memory());
		println!("channels: {}",self.channels.total_memory()+self.injection.total_memory()+self.ejection.total_memory());
	}
	fn forecast_total_memory(&self) -> usize
	{
		let pairs = self.topology.num_channels() + 2*self.topology.num_routers();
		size_of::<Network>() + self.topology.num_routers()*size_of::<Rc<RefCell<dyn Router>>>() + pairs*ChannelPair::new(ChannelKind::Torus,0).forecast_total_memory()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::error::ErrorKind;

	fn faults(link_failures:f64, fail_seed:f64) -> ConfigurationValue
	{
		ConfigurationValue::Object("Faults".to_string(),vec![
			("link_failures".to_string(),ConfigurationValue::Number(link_failures)),
			("fail_seed".to_string(),ConfigurationValue::Number(fail_seed)),
		])
	}

	#[test]
	fn faults_are_distinct_and_reproducible()
	{
		let channels:Vec<ChannelPair> = (0..10).map(|index|ChannelPair::new(ChannelKind::Torus,index)).collect();
		let selected = insert_random_faults(&channels,&faults(4.0,7.0)).unwrap();
		assert_eq!(selected.len(),4);
		assert!(selected.iter().all_unique());
		assert_eq!(channels.iter().filter(|pair|pair.is_faulty()).count(),4);
		assert!(selected.iter().all(|&index|channels[index].credit.borrow().is_faulty()));
		let others:Vec<ChannelPair> = (0..10).map(|index|ChannelPair::new(ChannelKind::Torus,index)).collect();
		assert_eq!(insert_random_faults(&others,&faults(4.0,7.0)).unwrap(),selected);
	}

	#[test]
	fn no_faults()
	{
		let channels:Vec<ChannelPair> = (0..3).map(|index|ChannelPair::new(ChannelKind::Torus,index)).collect();
		assert!(insert_random_faults(&channels,&faults(0.0,1.0)).unwrap().is_empty());
		assert!(channels.iter().all(|pair|!pair.is_faulty()));
	}

	#[test]
	fn too_many_faults()
	{
		let channels:Vec<ChannelPair> = (0..3).map(|index|ChannelPair::new(ChannelKind::Torus,index)).collect();
		let error = insert_random_faults(&channels,&faults(4.0,1.0)).unwrap_err();
		assert!(matches!(error.kind,ErrorKind::IllFormedConfiguration(_)));
		let selected = insert_random_faults(&channels,&faults(3.0,1.0)).unwrap();
		assert_eq!(selected,vec![0,1,2]);
	}
}
