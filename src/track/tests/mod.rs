mod test_builder_basic;
mod test_pipeline_basic;
