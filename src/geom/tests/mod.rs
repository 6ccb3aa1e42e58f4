mod test_frame_basic;
