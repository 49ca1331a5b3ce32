
/*!

The unidirectional torus: a k-ary n-cube in which each dimension is a ring traversed in a single sense.

Router `r` has coordinate `(r / k^d) mod k` in dimension `d`. It owns one outbound channel per dimension, with index `n*r+d`, going to the next router of the ring. Its input of dimension `d` is the outbound channel of the previous router of the ring.
The ports of every router are:
* input and output `d<n`: the channels of dimension `d`.
* input `n`: injection from the node.
* output `n`: ejection to the node.

The routing [`UnidirectionalDOR`] is made available to the plugs under the name `dor_unidirectional_torus` by [`UnidirectionalTorus::register_routing_functions`].

*/

use std::cell::RefCell;
use std::convert::TryFrom;
use std::ops::Range;

use itertools::Itertools;
use quantifiable_derive::Quantifiable;//the derive macro
use tracing::debug;

use super::prelude::*;
use crate::config::ConfigurationValue;
use crate::error::Error;
use crate::event::Time;
use crate::quantify::Quantifiable;
use crate::router::{new_router,RouterBuilderArgument};
use crate::routing::prelude::*;
use crate::{error,match_object,Plugs};

///Name under which the dimension order routing is registered.
pub const ROUTING_NAME: &str = "dor_unidirectional_torus";
///Latency of the links between routers of a conventional network.
pub const NETWORK_LINK_LATENCY: Time = 2;
///Latency of the links between routers in the same chip.
pub const ON_CHIP_LINK_LATENCY: Time = 1;
///Latency of the injection and ejection channels.
pub const TERMINAL_LINK_LATENCY: Time = 1;

///The population of a k-ary n-cube with a single channel per router and dimension.
#[derive(Quantifiable)]
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct TorusSize
{
	pub k: usize,
	pub n: usize,
	///`k^n`
	pub size: usize,
	///`n*size`
	pub channels: usize,
}

impl TorusSize
{
	pub fn new(k:usize, n:usize) -> Result<TorusSize,Error>
	{
		if k<1 || n<1
		{
			return Err(error!(invalid_topology,k,n).with_message("both the radix and the dimension must be at least 1".to_string()));
		}
		let exponent = u32::try_from(n).map_err(|_|error!(invalid_topology,k,n))?;
		let size = k.checked_pow(exponent).ok_or_else(||error!(invalid_topology,k,n).with_message("the amount of routers overflows".to_string()))?;
		let channels = n.checked_mul(size).ok_or_else(||error!(invalid_topology,k,n).with_message("the amount of channels overflows".to_string()))?;
		Ok(TorusSize{k,n,size,channels})
	}
}

///The unidirectional k-ary n-cube.
#[derive(Quantifiable)]
#[derive(Debug)]
pub struct UnidirectionalTorus
{
	cartesian_data: CartesianData,
	size: TorusSize,
	///Whether the links between routers are on-chip.
	use_noc_latency: bool,
}

impl UnidirectionalTorus
{
	pub fn new(cv:&ConfigurationValue) -> Result<UnidirectionalTorus,Error>
	{
		let mut k=None;
		let mut n=None;
		let mut use_noc_latency=false;
		match_object!(cv,"UnidirectionalTorus",value,
			"k" => k=Some(value.as_usize()?),
			"n" => n=Some(value.as_usize()?),
			"use_noc_latency" => use_noc_latency=latency_mode(value)?,
		);
		let k=k.ok_or_else(||cv.ill("There were no k"))?;
		let n=n.ok_or_else(||cv.ill("There were no n"))?;
		UnidirectionalTorus::with_parameters(k,n,use_noc_latency)
	}
	pub fn with_parameters(k:usize, n:usize, use_noc_latency:bool) -> Result<UnidirectionalTorus,Error>
	{
		let size = TorusSize::new(k,n)?;
		Ok(UnidirectionalTorus{
			cartesian_data: CartesianData::new_uniform(k,n),
			size,
			use_noc_latency,
		})
	}
	///Make the routings of this topology available by name.
	///Registering several times leaves the plugs as registering once.
	pub fn register_routing_functions(plugs:&mut Plugs)
	{
		plugs.add_routing(ROUTING_NAME.to_string(),new_dimension_order_routing);
	}
	pub fn size(&self) -> TorusSize
	{
		self.size
	}
	///The router reached from `node` by its channel in `dim`.
	pub fn onward_node(&self, node:usize, dim:usize) -> usize
	{
		self.neighbour(node,dim,Direction::Onward)
	}
	///The router whose channel in `dim` arrives to `node`.
	pub fn reverse_node(&self, node:usize, dim:usize) -> usize
	{
		self.neighbour(node,dim,Direction::Reverse)
	}
	pub fn neighbour(&self, node:usize, dim:usize, direction:Direction) -> usize
	{
		self.cartesian_data.step(node,dim,direction)
	}
	///The channel `node` uses to send along `dim`.
	pub fn outbound_channel(&self, node:usize, dim:usize) -> usize
	{
		self.size.n*node + dim
	}
	///The channel `node` receives from along `dim`.
	pub fn inbound_channel(&self, node:usize, dim:usize) -> usize
	{
		self.outbound_channel(self.reverse_node(node,dim),dim)
	}
	///The `(node,dim)` owning the outbound `channel`.
	pub fn channel_owner(&self, channel:usize) -> (usize,usize)
	{
		(channel/self.size.n, channel%self.size.n)
	}
	///The latency of the channels between routers.
	pub fn link_latency(&self) -> Time
	{
		if self.use_noc_latency { ON_CHIP_LINK_LATENCY } else { NETWORK_LINK_LATENCY }
	}
}

///Reads the `use_noc_latency` flag. Only booleans and the numbers 0 and 1 select a latency mode.
fn latency_mode(value:&ConfigurationValue) -> Result<bool,Error>
{
	match value
	{
		&ConfigurationValue::True => Ok(true),
		&ConfigurationValue::False => Ok(false),
		&ConfigurationValue::Number(x) if x==1.0 => Ok(true),
		&ConfigurationValue::Number(x) if x==0.0 => Ok(false),
		_ => Err(error!(unsupported_latency_mode,value.clone())),
	}
}

impl Topology for UnidirectionalTorus
{
	fn num_routers(&self) -> usize
	{
		self.size.size
	}
	fn num_channels(&self) -> usize
	{
		self.size.channels
	}
	fn k(&self) -> usize
	{
		self.size.k
	}
	fn n(&self) -> usize
	{
		self.size.n
	}
	fn capacity(&self) -> f64
	{
		1.0
	}
	fn num_input_ports(&self, _router_index:usize) -> usize
	{
		self.size.n+1
	}
	fn num_output_ports(&self, _router_index:usize) -> usize
	{
		self.size.n+1
	}
	fn cartesian_data(&self) -> Option<&CartesianData>
	{
		Some(&self.cartesian_data)
	}
	///`router` followed by the coordinates, most significant first. Just `router` when `k=1`.
	fn router_name(&self, router_index:usize) -> String
	{
		if self.size.k>1
		{
			format!("router_{}",self.cartesian_data.unpack(router_index).iter().rev().join("_"))
		}
		else
		{
			"router".to_string()
		}
	}
	fn build(&self, arg:WiringArgument) -> Result<(),Error>
	{
		let WiringArgument{router_cv,plugs,routers,channels,injection,ejection} = arg;
		let TorusSize{n,size,..} = self.size;
		if channels.len()!=self.size.channels || injection.len()!=size || ejection.len()!=size
		{
			return Err(error!(binding_mismatch,"network allocation".to_string()).with_message(format!("got {} channels and {}/{} terminal channels for {:?}",channels.len(),injection.len(),ejection.len(),self.size)));
		}
		let latency = self.link_latency();
		routers.reserve(size);
		for node in 0..size
		{
			let name = self.router_name(node);
			let router = new_router(RouterBuilderArgument{
				cv: router_cv,
				plugs,
				name,
				router_index: node,
				input_ports: n+1,
				output_ports: n+1,
			})?;
			{
				let mut router = router.borrow_mut();
				for dim in 0..n
				{
					let output = &channels[self.outbound_channel(node,dim)];
					let port = router.add_output_channel(output.clone())?;
					if port!=dim
					{
						return Err(error!(binding_mismatch,format!("torus {}",output.index())).with_message(format!("{} bound the dimension {} output to port {}",router.name(),dim,port)));
					}
					output.set_latency(latency);
				}
				for dim in 0..n
				{
					let input = &channels[self.inbound_channel(node,dim)];
					let port = router.add_input_channel(input.clone())?;
					if port!=dim
					{
						return Err(error!(binding_mismatch,format!("torus {}",input.index())).with_message(format!("{} bound the dimension {} input to port {}",router.name(),dim,port)));
					}
				}
				router.add_input_channel(injection[node].clone())?;
				router.add_output_channel(ejection[node].clone())?;
				injection[node].set_latency(TERMINAL_LINK_LATENCY);
				ejection[node].set_latency(TERMINAL_LINK_LATENCY);
				debug!(router=node, name=%router.name(), "wired router");
			}
			routers.push(router);
		}
		Ok(())
	}
}

fn new_dimension_order_routing(arg:RoutingBuilderArgument) -> Result<Box<dyn Routing>,Error>
{
	Ok(Box::new(UnidirectionalDOR::new(arg)?))
}

///Dimension order routing for the unidirectional torus.
///The dimensions are corrected in increasing order, always moving onward, and the packet is ejected when all coordinates match.
///
///With `dateline` (the default) the virtual channels are split in two classes to avoid deadlock in the rings.
///The lower half is used while the packet still has to cross the wraparound link of the current dimension, the upper half afterwards.
///With a single virtual channel it is offered in every hop.
#[derive(Debug)]
pub struct UnidirectionalDOR
{
	dateline: bool,
}

impl UnidirectionalDOR
{
	pub fn new(arg:RoutingBuilderArgument) -> Result<UnidirectionalDOR,Error>
	{
		let mut dateline=true;
		if let &ConfigurationValue::Object(_,_) = arg.cv
		{
			match_object!(arg.cv,[ROUTING_NAME],value,
				"dateline" => dateline=value.as_bool()?,
			);
		}
		Ok(UnidirectionalDOR{dateline})
	}
	///The virtual channels allowed for a hop in a dimension where the packet is at `current` coordinate towards `target`.
	fn virtual_channels(&self, current:usize, target:usize, num_virtual_channels:usize) -> Range<usize>
	{
		if !self.dateline || num_virtual_channels<2
		{
			return 0..num_virtual_channels;
		}
		let half = num_virtual_channels/2;
		if current>target
		{
			//The wraparound link is still ahead.
			0..half
		}
		else
		{
			half..num_virtual_channels
		}
	}
}

impl Routing for UnidirectionalDOR
{
	fn next(&self, routing_info:&RoutingInfo, topology:&dyn Topology, current_router:usize, target_router:usize, num_virtual_channels:usize) -> Result<RoutingNextCandidates,Error>
	{
		let routing_record = routing_info.routing_record.as_ref().ok_or_else(||error!(undetermined).with_message(format!("{} requires a routing record",ROUTING_NAME)))?;
		let cartesian_data = topology.cartesian_data().ok_or_else(||error!(bad_argument).with_message(format!("{} requires a Cartesian topology",ROUTING_NAME)))?;
		let n = routing_record.len();
		let remaining:usize = routing_record.iter().map(|&x|x as usize).sum();
		let candidates = match routing_record.iter().position(|&x|x!=0)
		{
			None =>
			{
				if current_router!=target_router
				{
					return Err(error!(undetermined).with_message(format!("empty routing record at router {} towards {}",current_router,target_router)));
				}
				//To the ejection port.
				(0..num_virtual_channels).map(|vc|CandidateEgress::new(n,vc)).collect()
			},
			Some(dim) =>
			{
				let current = cartesian_data.coordinate(current_router,dim);
				let target = cartesian_data.coordinate(target_router,dim);
				self.virtual_channels(current,target,num_virtual_channels).map(|vc|CandidateEgress{
					estimated_remaining_hops: Some(remaining),
					..CandidateEgress::new(dim,vc)
				}).collect()
			},
		};
		Ok(RoutingNextCandidates{candidates,idempotent:true})
	}
	fn initialize_routing_info(&self, routing_info:&RefCell<RoutingInfo>, topology:&dyn Topology, current_router:usize, target_router:usize) -> Result<(),Error>
	{
		let cartesian_data = topology.cartesian_data().ok_or_else(||error!(bad_argument).with_message(format!("{} requires a Cartesian topology",ROUTING_NAME)))?;
		let routing_record = (0..cartesian_data.sides.len()).map(|dim|cartesian_data.onward_distance(current_router,target_router,dim) as i32).collect();
		routing_info.borrow_mut().routing_record=Some(routing_record);
		Ok(())
	}
	fn update_routing_info(&self, routing_info:&RefCell<RoutingInfo>, _topology:&dyn Topology, current_router:usize, current_port:usize, _target_router:usize) -> Result<(),Error>
	{
		let mut routing_info = routing_info.borrow_mut();
		let routing_record = routing_info.routing_record.as_mut().ok_or_else(||error!(undetermined).with_message(format!("{} requires a routing record",ROUTING_NAME)))?;
		match routing_record.get_mut(current_port)
		{
			Some(pending) if *pending>0 =>
			{
				*pending-=1;
				Ok(())
			},
			_ => Err(error!(bad_argument).with_message(format!("router {} entered by port {} with routing record {:?}",current_router,current_port,routing_record))),
		}
	}
	fn initialize(&mut self, topology:&dyn Topology) -> Result<(),Error>
	{
		if topology.cartesian_data().is_none()
		{
			return Err(error!(bad_argument).with_message(format!("{} requires a Cartesian topology",ROUTING_NAME)));
		}
		let expected_ports = topology.n()+1;
		if (0..topology.num_routers()).any(|router|topology.num_output_ports(router)!=expected_ports)
		{
			return Err(error!(bad_argument).with_message(format!("{} requires {} output ports per router",ROUTING_NAME,expected_ports)));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::error::ErrorKind;
	use itertools::iproduct;

	fn torus_cv(k:f64, n:f64, use_noc_latency:ConfigurationValue) -> ConfigurationValue
	{
		ConfigurationValue::Object("UnidirectionalTorus".to_string(),vec![
			("k".to_string(),ConfigurationValue::Number(k)),
			("n".to_string(),ConfigurationValue::Number(n)),
			("use_noc_latency".to_string(),use_noc_latency),
		])
	}

	#[test]
	fn sizes()
	{
		for (k,n) in iproduct!(1..6usize,1..5usize)
		{
			let size = TorusSize::new(k,n).unwrap();
			assert_eq!(size.size,k.pow(n as u32));
			assert_eq!(size.channels,n*size.size);
		}
		let size = TorusSize::new(4,2).unwrap();
		assert_eq!((size.size,size.channels),(16,32));
		let size = TorusSize::new(2,1).unwrap();
		assert_eq!((size.size,size.channels),(2,2));
	}

	#[test]
	fn degenerate_parameters_are_rejected()
	{
		for (k,n) in [(0,2),(4,0),(0,0)]
		{
			let error = TorusSize::new(k,n).unwrap_err();
			assert!(matches!(error.kind,ErrorKind::InvalidTopology{..}));
		}
		assert!(TorusSize::new(usize::MAX,2).is_err());
		assert!(UnidirectionalTorus::new(&torus_cv(0.0,2.0,ConfigurationValue::False)).is_err());
	}

	#[test]
	fn four_ary_two_cube()
	{
		let torus = UnidirectionalTorus::with_parameters(4,2,false).unwrap();
		assert_eq!(torus.outbound_channel(0,0),0);
		assert_eq!(torus.outbound_channel(0,1),1);
		assert_eq!(torus.outbound_channel(3,1),7);
		assert_eq!(torus.onward_node(0,0),1);
		assert_eq!(torus.onward_node(3,0),0);
		assert_eq!(torus.reverse_node(0,0),3);
		assert_eq!(torus.onward_node(12,1),0);
		assert_eq!(torus.reverse_node(0,1),12);
		assert_eq!(torus.inbound_channel(0,0),torus.outbound_channel(3,0));
		assert_eq!(torus.inbound_channel(5,1),torus.outbound_channel(1,1));
		assert_eq!(torus.channel_owner(7),(3,1));
	}

	#[test]
	fn two_node_ring()
	{
		let torus = UnidirectionalTorus::with_parameters(2,1,false).unwrap();
		assert_eq!(torus.onward_node(0,0),1);
		assert_eq!(torus.reverse_node(0,0),1);
		assert_eq!(torus.onward_node(1,0),0);
		assert_eq!(torus.reverse_node(1,0),0);
		assert_eq!(torus.inbound_channel(0,0),1);
		assert_eq!(torus.inbound_channel(1,0),0);
	}

	#[test]
	fn radix_one_is_self_loops()
	{
		let torus = UnidirectionalTorus::with_parameters(1,3,false).unwrap();
		assert_eq!(torus.num_routers(),1);
		for dim in 0..3
		{
			assert_eq!(torus.onward_node(0,dim),0);
			assert_eq!(torus.reverse_node(0,dim),0);
			assert_eq!(torus.inbound_channel(0,dim),torus.outbound_channel(0,dim));
		}
		assert_eq!(torus.router_name(0),"router");
	}

	#[test]
	fn ring_consistency()
	{
		for (k,n) in iproduct!(2..6usize,1..4usize)
		{
			let torus = UnidirectionalTorus::with_parameters(k,n,false).unwrap();
			for (node,dim) in iproduct!(0..torus.num_routers(),0..n)
			{
				assert_eq!(torus.onward_node(torus.reverse_node(node,dim),dim),node);
				assert_eq!(torus.reverse_node(torus.onward_node(node,dim),dim),node);
				assert_ne!(torus.onward_node(node,dim),node);
			}
		}
	}

	#[test]
	fn outbound_channels_are_a_bijection()
	{
		let torus = UnidirectionalTorus::with_parameters(3,3,false).unwrap();
		let mut seen = vec![false;torus.num_channels()];
		for (node,dim) in iproduct!(0..torus.num_routers(),0..3)
		{
			let channel = torus.outbound_channel(node,dim);
			assert!(!seen[channel],"channel {} repeated",channel);
			seen[channel]=true;
			assert_eq!(torus.channel_owner(channel),(node,dim));
		}
		assert!(seen.iter().all(|&x|x));
	}

	#[test]
	fn router_names_list_coordinates()
	{
		let torus = UnidirectionalTorus::with_parameters(4,2,false).unwrap();
		assert_eq!(torus.router_name(0),"router_0_0");
		assert_eq!(torus.router_name(1),"router_0_1");
		assert_eq!(torus.router_name(6),"router_1_2");
		assert_eq!(torus.router_name(15),"router_3_3");
	}

	#[test]
	fn latency_modes()
	{
		let torus = UnidirectionalTorus::new(&torus_cv(4.0,2.0,ConfigurationValue::True)).unwrap();
		assert_eq!(torus.link_latency(),ON_CHIP_LINK_LATENCY);
		let torus = UnidirectionalTorus::new(&torus_cv(4.0,2.0,ConfigurationValue::Number(1.0))).unwrap();
		assert_eq!(torus.link_latency(),ON_CHIP_LINK_LATENCY);
		let torus = UnidirectionalTorus::new(&torus_cv(4.0,2.0,ConfigurationValue::Number(0.0))).unwrap();
		assert_eq!(torus.link_latency(),NETWORK_LINK_LATENCY);
		let error = UnidirectionalTorus::new(&torus_cv(4.0,2.0,ConfigurationValue::Number(2.0))).unwrap_err();
		assert!(matches!(error.kind,ErrorKind::UnsupportedLatencyMode(_)));
		let error = UnidirectionalTorus::new(&torus_cv(4.0,2.0,ConfigurationValue::Literal("noc".to_string()))).unwrap_err();
		assert!(matches!(error.kind,ErrorKind::UnsupportedLatencyMode(_)));
	}

	#[test]
	fn accessors()
	{
		let torus = UnidirectionalTorus::new(&torus_cv(3.0,2.0,ConfigurationValue::False)).unwrap();
		assert_eq!(torus.k(),3);
		assert_eq!(torus.n(),2);
		assert_eq!(torus.capacity(),1.0);
		assert_eq!(torus.num_input_ports(0),3);
		assert_eq!(torus.num_output_ports(8),3);
		assert!(torus.total_memory()>0);
		assert!(torus.forecast_total_memory()>=std::mem::size_of::<UnidirectionalTorus>());
	}

	#[test]
	fn registration_is_idempotent()
	{
		let mut plugs = Plugs::default();
		assert!(plugs.routing(ROUTING_NAME).is_none());
		UnidirectionalTorus::register_routing_functions(&mut plugs);
		let once = format!("{:?}",plugs);
		UnidirectionalTorus::register_routing_functions(&mut plugs);
		assert!(plugs.routing(ROUTING_NAME).is_some());
		assert_eq!(format!("{:?}",plugs),once);
	}

	#[test]
	fn dateline_classes()
	{
		let plugs = Plugs::default();
		let cv = ConfigurationValue::Literal(ROUTING_NAME.to_string());
		let routing = UnidirectionalDOR::new(RoutingBuilderArgument{cv:&cv,plugs:&plugs}).unwrap();
		assert_eq!(routing.virtual_channels(3,1,4),0..2);
		assert_eq!(routing.virtual_channels(0,1,4),2..4);
		assert_eq!(routing.virtual_channels(3,1,1),0..1);
		let cv = ConfigurationValue::Object(ROUTING_NAME.to_string(),vec![("dateline".to_string(),ConfigurationValue::False)]);
		let routing = UnidirectionalDOR::new(RoutingBuilderArgument{cv:&cv,plugs:&plugs}).unwrap();
		assert_eq!(routing.virtual_channels(3,1,4),0..4);
	}

	#[test]
	fn routing_record_follows_dimension_order()
	{
		let plugs = Plugs::default();
		let cv = ConfigurationValue::Literal(ROUTING_NAME.to_string());
		let mut routing = UnidirectionalDOR::new(RoutingBuilderArgument{cv:&cv,plugs:&plugs}).unwrap();
		let torus = UnidirectionalTorus::with_parameters(4,2,true).unwrap();
		routing.initialize(&torus).unwrap();
		let routing_info = RefCell::new(RoutingInfo::new());
		//From (3,0) to (1,2): two hops in dimension 0 wrapping, two in dimension 1.
		routing.initialize_routing_info(&routing_info,&torus,3,9).unwrap();
		assert_eq!(routing_info.borrow().routing_record,Some(vec![2,2]));
		let candidates = routing.next(&routing_info.borrow(),&torus,3,9,2).unwrap();
		assert_eq!(candidates.candidates,vec![CandidateEgress{estimated_remaining_hops:Some(4),..CandidateEgress::new(0,0)}]);
		routing.update_routing_info(&routing_info,&torus,0,0,9).unwrap();
		let candidates = routing.next(&routing_info.borrow(),&torus,0,9,2).unwrap();
		assert_eq!(candidates.candidates.iter().map(|c|(c.port,c.virtual_channel)).collect::<Vec<_>>(),vec![(0,1)]);
		//Entering through a dimension already corrected is an error.
		routing.update_routing_info(&routing_info,&torus,1,0,9).unwrap();
		assert!(routing.update_routing_info(&routing_info,&torus,2,0,9).is_err());
	}
}
