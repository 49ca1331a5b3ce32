
/*!

Errors raised while building a network. Every error carries the source location where it was raised.

Build errors with the `error!` macro, using the snake case name of the kind followed by its arguments.
```ignore
return Err(error!(invalid_topology,k,n).with_message(format!("while reading {}",cv)));
```

*/

use std::fmt::{self,Display,Formatter};
use std::path::PathBuf;

use crate::config::ConfigurationValue;

///A place in the code of this crate.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

impl Display for SourceLocation
{
	fn fmt(&self, formatter: &mut Formatter) -> fmt::Result
	{
		write!(formatter,"{}:{}:{}",self.file,self.line,self.column)
	}
}

///Builds the `SourceLocation` of the macro call.
#[macro_export]
macro_rules! source_location{
	() => {
		$crate::error::SourceLocation{
			file: file!(),
			line: line!(),
			column: column!(),
		}
	}
}

///Builds an `Error` of the given kind, annotated with the place of the call.
///`error!(kind_name,arg1,arg2)` calls `Error::kind_name(source_location!(),arg1,arg2)`.
#[macro_export]
macro_rules! error{
	($kind:ident) => {{
		$crate::error::Error::$kind( $crate::source_location!() )
	}};
	($kind:ident, $($args:expr),* ) => {{
		$crate::error::Error::$kind( $crate::source_location!(), $($args),* )
	}};
}

#[derive(Debug,thiserror::Error)]
pub enum ErrorKind
{
	///The radix and dimension do not define a torus: `k<1`, `n<1`, or sizes not representable.
	#[error("invalid topology parameters k={k} n={n}")]
	InvalidTopology{
		k: usize,
		n: usize,
	},
	///A channel was bound twice, or left unbound, or a router was given more channels than ports.
	#[error("channel binding mismatch on {channel}")]
	BindingMismatch{
		channel: String,
	},
	///The latency mode is neither the generic network delay nor the on-chip delay.
	#[error("unsupported latency mode {0}")]
	UnsupportedLatencyMode(ConfigurationValue),
	#[error("ill formed configuration {0}")]
	IllFormedConfiguration(ConfigurationValue),
	///There is neither a plug nor a predefined component with that name.
	#[error("unknown {component} `{name}`")]
	UnknownName{
		component: &'static str,
		name: String,
	},
	#[error("could not open file {filepath:?}: {error}")]
	CouldNotOpenFile{
		filepath: PathBuf,
		#[source]
		error: std::io::Error,
	},
	#[error("bad argument")]
	BadArgument,
	#[error("undetermined error")]
	Undetermined,
}

#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{
			source_location,
			kind,
			message: None,
		}
	}
	///Attach a free text to the error. Replaces any previous message.
	pub fn with_message(mut self, message:String) -> Error
	{
		self.message = Some(message);
		self
	}
	pub fn invalid_topology(source_location:SourceLocation, k:usize, n:usize) -> Error
	{
		Error::new(source_location,ErrorKind::InvalidTopology{k,n})
	}
	pub fn binding_mismatch(source_location:SourceLocation, channel:String) -> Error
	{
		Error::new(source_location,ErrorKind::BindingMismatch{channel})
	}
	pub fn unsupported_latency_mode(source_location:SourceLocation, value:ConfigurationValue) -> Error
	{
		Error::new(source_location,ErrorKind::UnsupportedLatencyMode(value))
	}
	pub fn ill_formed_configuration(source_location:SourceLocation, value:ConfigurationValue) -> Error
	{
		Error::new(source_location,ErrorKind::IllFormedConfiguration(value))
	}
	pub fn unknown_name(source_location:SourceLocation, component:&'static str, name:String) -> Error
	{
		Error::new(source_location,ErrorKind::UnknownName{component,name})
	}
	pub fn could_not_open_file(source_location:SourceLocation, filepath:PathBuf, error:std::io::Error) -> Error
	{
		Error::new(source_location,ErrorKind::CouldNotOpenFile{filepath,error})
	}
	pub fn bad_argument(source_location:SourceLocation) -> Error
	{
		Error::new(source_location,ErrorKind::BadArgument)
	}
	pub fn undetermined(source_location:SourceLocation) -> Error
	{
		Error::new(source_location,ErrorKind::Undetermined)
	}
}

impl Display for Error
{
	fn fmt(&self, formatter: &mut Formatter) -> fmt::Result
	{
		write!(formatter,"{} (raised at {})",self.kind,self.source_location)?;
		if let Some(message) = &self.message
		{
			write!(formatter,": {}",message)?;
		}
		Ok(())
	}
}

impl std::error::Error for Error
{
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)>
	{
		Some(&self.kind)
	}
}
