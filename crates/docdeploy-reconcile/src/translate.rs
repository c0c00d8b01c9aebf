//! Schema model to adapter-native request translation.

use docdeploy_client::{
    CollectionSpec, ExcludedPathDescriptor, IncludedPathDescriptor, IndexDescriptor,
    IndexingPolicyDescriptor, PartitionKeyDefinition,
};
use docdeploy_core::{Collection, IndexKind, IndexingPolicy};

pub fn indexing_policy_descriptor(policy: &IndexingPolicy) -> IndexingPolicyDescriptor {
    IndexingPolicyDescriptor {
        automatic: policy.automatic,
        indexing_mode: policy.indexing_mode,
        included_paths: policy
            .included_paths
            .iter()
            .map(|included| IncludedPathDescriptor {
                path: included.path.clone(),
                indexes: included
                    .indexes
                    .iter()
                    .map(|index| IndexDescriptor {
                        kind: index.kind,
                        data_type: index.data_type,
                        // Spatial indexes take no precision.
                        precision: match index.kind {
                            IndexKind::Spatial => None,
                            IndexKind::Range | IndexKind::Hash => index.precision,
                        },
                    })
                    .collect(),
            })
            .collect(),
        excluded_paths: policy
            .excluded_paths
            .iter()
            .map(|excluded| ExcludedPathDescriptor {
                path: excluded.path.clone(),
            })
            .collect(),
    }
}

pub fn collection_spec(collection: &Collection) -> CollectionSpec {
    CollectionSpec {
        id: collection.name.clone(),
        partition_key: PartitionKeyDefinition::hash(&collection.partition_key),
        indexing_policy: indexing_policy_descriptor(&collection.indexing_policy),
        offer_throughput: collection.offer_throughput,
    }
}
