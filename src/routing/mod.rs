
/*!

A Routing defines the ways to select a next router to eventually reach the destination.

Routings are discovered by name through the plugs. Topologies register their own routings, see
[`UnidirectionalTorus::register_routing_functions`](../topology/unidirectional_torus/struct.UnidirectionalTorus.html#method.register_routing_functions).

*/

use std::cell::RefCell;
use std::fmt::Debug;

use crate::config::ConfigurationValue;
use crate::topology::Topology;
use crate::{error,Plugs};
pub use crate::error::Error;

pub mod prelude
{
	pub use super::{new_routing,Routing,RoutingInfo,RoutingNextCandidates,CandidateEgress,RoutingBuilderArgument,Error};
}

///Information stored in the packet for the `Routing` algorithms to operate.
#[derive(Debug,Default)]
pub struct RoutingInfo
{
	///Pending movement in each coordinate, as computed and updated by the routing.
	pub routing_record: Option<Vec<i32>>,
}

impl RoutingInfo
{
	pub fn new() -> RoutingInfo
	{
		RoutingInfo{
			routing_record: None,
		}
	}
}

///Represent a port plus additional information that a routing algorithm can determine on how a packet must advance to the next router or server.
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct CandidateEgress
{
	///Candidate exit port
	pub port: usize,
	///Candidate virtual channel in which being inserted.
	pub virtual_channel: usize,
	///An estimation of the number of hops pending. This include the hop we are requesting.
	pub estimated_remaining_hops: Option<usize>,
}

impl CandidateEgress
{
	pub fn new(port:usize, virtual_channel:usize)->CandidateEgress
	{
		CandidateEgress{
			port,
			virtual_channel,
			estimated_remaining_hops: None,
		}
	}
}

///The candidates as provided by the routing together with related information.
///This is, the return type of `Routing::next`.
#[derive(Clone,Debug,Default)]
pub struct RoutingNextCandidates
{
	///The vector of candidates.
	pub candidates: Vec<CandidateEgress>,
	///Whether sucessive calls to the routing algorithm will find the exact same set of candidates.
	pub idempotent: bool,
}

impl IntoIterator for RoutingNextCandidates
{
	type Item = CandidateEgress;
	type IntoIter = <Vec<CandidateEgress> as IntoIterator>::IntoIter;
	fn into_iter(self) -> <Self as IntoIterator>::IntoIter
	{
		self.candidates.into_iter()
	}
}

///A routing algorithm to provide candidate routes when the `Router` requires.
///It may store/use information in the RoutingInfo.
pub trait Routing : Debug
{
	/// Compute the list of allowed exits.
	/// `routing_info` contains the information in the packet being routed.
	/// `current_router` is the index of the router in the `topology` that is performing the routing.
	/// `target_router` is the index of the router towards which we are routing.
	/// `num_virtual_channels` is the number of virtual channels dedicated to this routing.
	fn next(&self, routing_info:&RoutingInfo, topology:&dyn Topology, current_router:usize, target_router:usize, num_virtual_channels:usize) -> Result<RoutingNextCandidates,Error>;
	///Initialize the routing info of the packet. Called when the packet leaves the node and enters its router.
	fn initialize_routing_info(&self, _routing_info:&RefCell<RoutingInfo>, _topology:&dyn Topology, _current_router:usize, _target_router:usize) -> Result<(),Error> { Ok(()) }
	///Updates the routing info of the packet. Called when the packet enters `current_router` by its input `current_port`.
	fn update_routing_info(&self, _routing_info:&RefCell<RoutingInfo>, _topology:&dyn Topology, _current_router:usize, _current_port:usize, _target_router:usize) -> Result<(),Error> { Ok(()) }
	///Prepares the routing to be utilized, checking the topology is suitable.
	fn initialize(&mut self, _topology:&dyn Topology) -> Result<(),Error> { Ok(()) }
}

///The argument of a builder function for `Routings`.
#[derive(Debug)]
pub struct RoutingBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the routing.
	pub cv: &'a ConfigurationValue,
	///The user defined plugs. In case the routing needs to create elements.
	pub plugs: &'a Plugs,
}

/**Build a new routing.

Routings are resolved by name in the plugs, so a routing must have been registered before, usually by the topology it is designed for.
Either an object or just a literal with the name are accepted.

```ignore
dor_unidirectional_torus{
	dateline: true,
	legend_name: "dimension order on the unidirectional torus",
}
```
*/
pub fn new_routing(arg: RoutingBuilderArgument) -> Result<Box<dyn Routing>,Error>
{
	let name = match arg.cv
	{
		&ConfigurationValue::Object(ref cv_name, ref _cv_pairs) => cv_name,
		&ConfigurationValue::Literal(ref cv_name) => cv_name,
		_ => return Err(error!(ill_formed_configuration,arg.cv.clone()).with_message("Trying to create a Routing from a non-Object".to_string())),
	};
	match arg.plugs.routing(name)
	{
		Some(builder) => builder(arg),
		None => Err(error!(unknown_name,"routing",name.to_string())),
	}
}
