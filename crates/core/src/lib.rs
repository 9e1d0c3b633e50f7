pub mod estimation {
    pub mod domain {
        pub mod inference_output;
        pub mod pose_estimator;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod dimension_stabilizer;
    pub mod pipeline_config;
    pub mod pipeline_error;
    pub mod pipeline_logger;
    pub mod render_video_use_case;

    pub mod infrastructure {
        pub mod render_use_case_factory;
    }
}

pub mod rendering {
    pub mod domain {
        pub mod compositor;
    }
    pub mod infrastructure;
}

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod model_resolver;
    pub mod rendered_image;
    pub mod video_metadata;
}

pub mod video {
    pub mod domain {
        pub mod video_reader;
        pub mod video_writer;
    }
    pub mod infrastructure {
        pub mod ffmpeg_reader;
        pub mod ffmpeg_writer;
    }
}
