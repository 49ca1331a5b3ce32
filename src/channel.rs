
/*!

Physical channels owned by the network and shared with the routers bound to them.

Every link is a `ChannelPair`: the data channel carries flits from its source port to its sink port, and the credit channel carries credits back in the opposite direction.
Binding a pair as a router output makes that router the source of the data channel and the sink of the credit channel; binding it as an input does the converse.
A channel side can be bound only once.

*/

use std::rc::Rc;
use std::cell::RefCell;
use std::fmt;

use quantifiable_derive::Quantifiable;//the derive macro
use crate::quantify::Quantifiable;
use crate::event::Time;
use crate::error::Error;
use crate::error;

///The role of a channel in the network.
#[derive(Quantifiable)]
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum ChannelKind
{
	///A link between two routers of the torus.
	Torus,
	///From the node into its router.
	Injection,
	///From the router to its node.
	Ejection,
}

impl fmt::Display for ChannelKind
{
	fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result
	{
		let name = match self
		{
			ChannelKind::Torus => "torus",
			ChannelKind::Injection => "injection",
			ChannelKind::Ejection => "ejection",
		};
		write!(formatter,"{}",name)
	}
}

///A router port at one end of a channel.
#[derive(Quantifiable)]
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub struct Endpoint
{
	pub router_index: usize,
	pub port: usize,
}

#[derive(Quantifiable)]
#[derive(Debug)]
pub struct Channel
{
	kind: ChannelKind,
	///Identity of the channel among those of its kind.
	index: usize,
	///Whether this is the credit return channel of the pair.
	credit: bool,
	latency: Time,
	source: Option<Endpoint>,
	sink: Option<Endpoint>,
	fault: bool,
}

impl Channel
{
	pub fn new(kind:ChannelKind, index:usize, credit:bool) -> Channel
	{
		Channel{
			kind,
			index,
			credit,
			latency: 1,
			source: None,
			sink: None,
			fault: false,
		}
	}
	pub fn kind(&self) -> ChannelKind
	{
		self.kind
	}
	pub fn index(&self) -> usize
	{
		self.index
	}
	pub fn is_credit(&self) -> bool
	{
		self.credit
	}
	pub fn latency(&self) -> Time
	{
		self.latency
	}
	pub fn set_latency(&mut self, latency:Time)
	{
		self.latency = latency;
	}
	pub fn source(&self) -> Option<Endpoint>
	{
		self.source
	}
	pub fn sink(&self) -> Option<Endpoint>
	{
		self.sink
	}
	pub fn is_faulty(&self) -> bool
	{
		self.fault
	}
	pub fn set_fault(&mut self, fault:bool)
	{
		self.fault = fault;
	}
	fn label(&self) -> String
	{
		format!("{} {}{}",self.kind,if self.credit {"credit "} else {""},self.index)
	}
	pub fn bind_source(&mut self, endpoint:Endpoint) -> Result<(),Error>
	{
		if let Some(previous) = self.source
		{
			return Err(error!(binding_mismatch,self.label()).with_message(format!("source already bound to {:?}, trying {:?}",previous,endpoint)));
		}
		self.source = Some(endpoint);
		Ok(())
	}
	pub fn bind_sink(&mut self, endpoint:Endpoint) -> Result<(),Error>
	{
		if let Some(previous) = self.sink
		{
			return Err(error!(binding_mismatch,self.label()).with_message(format!("sink already bound to {:?}, trying {:?}",previous,endpoint)));
		}
		self.sink = Some(endpoint);
		Ok(())
	}
}

///A data channel together with its credit return channel.
#[derive(Clone,Debug)]
pub struct ChannelPair
{
	pub data: Rc<RefCell<Channel>>,
	pub credit: Rc<RefCell<Channel>>,
}

impl ChannelPair
{
	pub fn new(kind:ChannelKind, index:usize) -> ChannelPair
	{
		ChannelPair{
			data: Rc::new(RefCell::new(Channel::new(kind,index,false))),
			credit: Rc::new(RefCell::new(Channel::new(kind,index,true))),
		}
	}
	pub fn kind(&self) -> ChannelKind
	{
		self.data.borrow().kind()
	}
	pub fn index(&self) -> usize
	{
		self.data.borrow().index()
	}
	///Sets the latency of both the data and the credit channel.
	pub fn set_latency(&self, latency:Time)
	{
		self.data.borrow_mut().set_latency(latency);
		self.credit.borrow_mut().set_latency(latency);
	}
	pub fn latency(&self) -> Time
	{
		self.data.borrow().latency()
	}
	pub fn set_fault(&self, fault:bool)
	{
		self.data.borrow_mut().set_fault(fault);
		self.credit.borrow_mut().set_fault(fault);
	}
	pub fn is_faulty(&self) -> bool
	{
		self.data.borrow().is_faulty()
	}
	///The router port sending flits into the pair.
	pub fn source(&self) -> Option<Endpoint>
	{
		self.data.borrow().source()
	}
	///The router port receiving flits from the pair.
	pub fn sink(&self) -> Option<Endpoint>
	{
		self.data.borrow().sink()
	}
	///Bind as an output of the router port `endpoint`.
	pub fn bind_as_output(&self, endpoint:Endpoint) -> Result<(),Error>
	{
		self.data.borrow_mut().bind_source(endpoint)?;
		self.credit.borrow_mut().bind_sink(endpoint)
	}
	///Bind as an input of the router port `endpoint`.
	pub fn bind_as_input(&self, endpoint:Endpoint) -> Result<(),Error>
	{
		self.data.borrow_mut().bind_sink(endpoint)?;
		self.credit.borrow_mut().bind_source(endpoint)
	}
}

impl Quantifiable for ChannelPair
{
	fn total_memory(&self) -> usize
	{
		self.data.total_memory() + self.credit.total_memory()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		2*std::mem::size_of::<Rc<RefCell<Channel>>>() + 2*std::mem::size_of::<Channel>()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::error::ErrorKind;

	#[test]
	fn output_binding_reverses_credit()
	{
		let pair = ChannelPair::new(ChannelKind::Torus,5);
		let a = Endpoint{router_index:1,port:0};
		let b = Endpoint{router_index:2,port:0};
		pair.bind_as_output(a).unwrap();
		pair.bind_as_input(b).unwrap();
		assert_eq!(pair.source(),Some(a));
		assert_eq!(pair.sink(),Some(b));
		let credit = pair.credit.borrow();
		assert_eq!(credit.source(),Some(b));
		assert_eq!(credit.sink(),Some(a));
		assert!(credit.is_credit());
	}

	#[test]
	fn double_binding_is_rejected()
	{
		let pair = ChannelPair::new(ChannelKind::Torus,0);
		pair.bind_as_output(Endpoint{router_index:0,port:0}).unwrap();
		let error = pair.bind_as_output(Endpoint{router_index:3,port:1}).unwrap_err();
		assert!(matches!(error.kind,ErrorKind::BindingMismatch{..}));
	}

	#[test]
	fn latency_applies_to_both_channels()
	{
		let pair = ChannelPair::new(ChannelKind::Injection,0);
		assert_eq!(pair.latency(),1);
		pair.set_latency(2);
		assert_eq!(pair.data.borrow().latency(),2);
		assert_eq!(pair.credit.borrow().latency(),2);
	}
}
