mod proj;

pub(crate) use proj::reproject_shapes;
