
use quantifiable_derive::Quantifiable;//the derive macro
use crate::quantify::Quantifiable;

///The sense of a step along a dimension of a ring.
///In the two dimensional drawings the onward step is to the east in dimension 0 and to the north in dimension 1; the reverse step is to the west and to the south.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Direction
{
	///Increase the coordinate, from `side-1` wrapping to 0.
	Onward,
	///Decrease the coordinate, from 0 wrapping to `side-1`.
	Reverse,
}

///A Cartesian ortahedral region of arbitrary dimension.
///Indices are mixed radix numbers, with the dimension 0 as least significant digit.
#[derive(Quantifiable)]
#[derive(Debug,Clone)]
pub struct CartesianData
{
	pub sides: Vec<usize>,
	pub size: usize,
}

impl CartesianData
{
	pub fn new(sides:&[usize]) -> CartesianData
	{
		CartesianData{
			sides:sides.to_vec(),
			size: sides.iter().product(),
		}
	}
	///A region with the same `side` in each of the `dimensions`.
	pub fn new_uniform(side:usize, dimensions:usize) -> CartesianData
	{
		CartesianData::new(&vec![side;dimensions])
	}
	pub fn unpack(&self, mut router_index: usize) -> Vec<usize>
	{
		if router_index>=self.size
		{
			panic!("router_index={} is greater than the size of the CartesianData={}",router_index,self.size);
		}
		let mut r=Vec::with_capacity(self.sides.len());
		for side in self.sides.iter()
		{
			r.push(router_index%side);
			router_index/=side;
		}
		r
	}
	pub fn pack(&self, coordinates:&[usize]) -> usize
	{
		//check that the coordinates are within the sides
		for (c,s) in coordinates.iter().zip(self.sides.iter())
		{
			if *c>=*s
			{
				panic!("coordinate {} is greater than the side {}",c,s);
			}
		}
		let mut r=0;
		let mut stride=1;
		for (i,side) in self.sides.iter().enumerate()
		{
			r+=coordinates[i]*stride;
			stride*=side;
		}
		r
	}
	///The difference of index between two routers differing by one in the coordinate `dimension`.
	pub fn stride(&self, dimension:usize) -> usize
	{
		self.sides[..dimension].iter().product()
	}
	///The coordinate of `router_index` in `dimension`, without unpacking the others.
	pub fn coordinate(&self, router_index:usize, dimension:usize) -> usize
	{
		(router_index/self.stride(dimension))%self.sides[dimension]
	}
	///The index reached after a step along `dimension`, wrapping around at the boundaries.
	///With a side of 1 the step returns to the same router.
	pub fn step(&self, router_index:usize, dimension:usize, direction:Direction) -> usize
	{
		let stride = self.stride(dimension);
		let side = self.sides[dimension];
		let coordinate = (router_index/stride)%side;
		match direction
		{
			Direction::Onward =>
			{
				if coordinate==side-1 { router_index - (side-1)*stride } else { router_index + stride }
			},
			Direction::Reverse =>
			{
				if coordinate==0 { router_index + (side-1)*stride } else { router_index - stride }
			},
		}
	}
	///Number of onward steps along `dimension` to align the coordinate of `origin` with the one of `destination`.
	pub fn onward_distance(&self, origin:usize, destination:usize, dimension:usize) -> usize
	{
		let side = self.sides[dimension];
		(side + self.coordinate(destination,dimension) - self.coordinate(origin,dimension)) % side
	}
}
