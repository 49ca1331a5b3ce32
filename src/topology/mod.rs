
/*!

A Topology defines the way routers are connected, and is responsible for creating the routers and wiring them to the channels owned by the network.

see [`new_topology`](fn.new_topology.html) for documentation on the configuration syntax of predefined topologies.

*/

pub mod cartesian;
pub mod unidirectional_torus;

use std::cell::RefCell;
use std::rc::Rc;
use std::fmt::Debug;

use self::cartesian::CartesianData;
use self::unidirectional_torus::UnidirectionalTorus;
use crate::channel::ChannelPair;
use crate::config::ConfigurationValue;
use crate::error::Error;
use crate::quantify::Quantifiable;
use crate::router::Router;
use crate::{error,Plugs};

/// Some things most uses of the topology module will use.
pub mod prelude
{
	pub use super::{Topology,TopologyBuilderArgument,WiringArgument,new_topology,cartesian::{CartesianData,Direction}};
	pub use std::cell::{RefCell};
	pub use std::rc::Rc;
}

///A topology describes how many routers there are, how many channels join them, and how each router is bound to the channels.
///Router `r` has `num_input_ports(r)` inputs and `num_output_ports(r)` outputs, all of which must be bound by `build`.
pub trait Topology : Quantifiable + Debug
{
	///Amount of routers, one per node.
	fn num_routers(&self) -> usize;
	///Amount of channels between routers. Injection and ejection channels are not included.
	fn num_channels(&self) -> usize;
	///Radix, the number of routers along each dimension.
	fn k(&self) -> usize;
	///Number of dimensions.
	fn n(&self) -> usize;
	///Capacity of each link relative to the bidirectional torus of the same shape.
	fn capacity(&self) -> f64;
	fn num_input_ports(&self, router_index:usize) -> usize;
	fn num_output_ports(&self, router_index:usize) -> usize;
	///Specific for some topologies, but must be checkable for anyone
	fn cartesian_data(&self) -> Option<&CartesianData>;
	///The name given to the router at construction.
	fn router_name(&self, router_index:usize) -> String;
	///Create every router and bind it to its channels, setting the latencies of the channels.
	///`arg.channels` has exactly `num_channels()` elements and the terminal lists have `num_routers()`.
	fn build(&self, arg:WiringArgument) -> Result<(),Error>;
	///Mark some channels as faulty following the configuration `cv`. Returns the indices of the channels marked.
	///The default selects channels uniformly, see [`insert_random_faults`](../network/fn.insert_random_faults.html).
	fn insert_random_faults(&self, channels:&[ChannelPair], cv:&ConfigurationValue) -> Result<Vec<usize>,Error>
	{
		crate::network::insert_random_faults(channels,cv)
	}
}

///The argument of a builder function for `Topology`s.
#[derive(Debug)]
pub struct TopologyBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the topology.
	pub cv: &'a ConfigurationValue,
	///The user defined plugs. In case the topology needs to create elements.
	pub plugs: &'a Plugs,
}

///What `Topology::build` needs from the network to wire it.
pub struct WiringArgument<'a>
{
	///A ConfigurationValue::Object defining the routers.
	pub router_cv: &'a ConfigurationValue,
	///The user defined plugs, used to create the routers.
	pub plugs: &'a Plugs,
	///Where to push the routers, in router index order.
	pub routers: &'a mut Vec<Rc<RefCell<dyn Router>>>,
	///The channels between routers.
	pub channels: &'a [ChannelPair],
	///The channels into each router, by router index.
	pub injection: &'a [ChannelPair],
	///The channels out of each router, by router index.
	pub ejection: &'a [ChannelPair],
}

/**Build a new topology.

## Unidirectional torus

A k-ary n-cube in which every router has a single link per dimension, towards the next router of the ring. Each router has `n+1` input and `n+1` output ports: one per dimension plus the injection/ejection ports.
The flag `use_noc_latency` selects links of 1 cycle, as between routers in the same chip. Otherwise the links take 2 cycles.

```ignore
UnidirectionalTorus{
	k: 4,
	n: 2,
	use_noc_latency: false,
	legend_name: "4-ary 2-cube, one direction",
}
```

Any other name must be registered in the plugs with `Plugs::add_topology`.
*/
pub fn new_topology(arg:TopologyBuilderArgument) -> Result<Box<dyn Topology>,Error>
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs)=arg.cv
	{
		if let Some(builder) = arg.plugs.topology(cv_name)
		{
			return builder(arg);
		}
		match cv_name.as_ref()
		{
			"UnidirectionalTorus" =>
			{
				let topology:Box<dyn Topology> = Box::new(UnidirectionalTorus::new(arg.cv)?);
				Ok(topology)
			},
			_ => Err(error!(unknown_name,"topology",cv_name.to_string())),
		}
	}
	else
	{
		Err(error!(ill_formed_configuration,arg.cv.clone()).with_message("Trying to create a topology from a non-Object".to_string()))
	}
}
