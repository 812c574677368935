mod test_mesh_sanity;
mod test_triangulation_basic;
