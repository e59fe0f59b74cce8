pub mod shared {
    pub mod constants;
    pub mod face_box;
    pub mod frame;
    pub mod timestamp;
    pub mod video_metadata;
}

pub mod detection {
    pub mod domain {
        pub mod detection_params;
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod validation {
    pub mod domain {
        pub mod face_validator;
        pub mod frame_quality;
        pub mod sharpness;
        pub mod validation_result;
    }
}

pub mod composition {
    pub mod domain {
        pub mod crop_composer;
    }
}

pub mod enhancement {
    pub mod domain {
        pub mod frame_enhancer;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod frame_source;
        pub mod image_reader;
        pub mod image_writer;
    }
    pub mod infrastructure {
        pub mod ffmpeg_frame_source;
        pub mod image_file_reader;
        pub mod image_file_writer;
    }
}

pub mod pipeline {
    pub mod batch_logger;
    pub mod frame_result;
    pub mod frame_selector;
    pub mod inspect_image_use_case;
    pub mod quote_frames_use_case;
    pub mod range_frames_use_case;
    pub mod temporal_search;
}
